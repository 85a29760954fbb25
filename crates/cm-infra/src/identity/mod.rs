mod local;

pub use local::LocalIdentityProvider;
