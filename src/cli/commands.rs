use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use cm_app::usecases::GenerateRecipesError;
use cm_app::{RecognitionOutcome, SaveOutcome, Session, SessionError};
use cm_core::{AppConfig, Cuisine, DocId, Identity, Language, Preferences, SourceImage, SpiceLevel};
use cm_infra::LocalIdentityProvider;
use tracing::{info, info_span, Instrument};

use super::{render, Command, GenerateArgs};
use crate::bootstrap::{configured_language, wire_dependencies};

/// Run one command against a fresh session.
pub async fn run(command: Command, config: &AppConfig) -> anyhow::Result<()> {
    match command {
        Command::Recognize { image, lang } => {
            let session = open_session(config, None, lang.as_deref())?;
            recognize(&session, &image)
                .instrument(info_span!("cli.recognize"))
                .await
        }
        Command::Generate(args) => {
            let (session, identity) = open_session_with_identity(config, None, args.lang.as_deref())?;
            generate(&session, &identity, args)
                .instrument(info_span!("cli.generate"))
                .await
        }
        Command::Saved { user, remove } => {
            let session = open_session(config, Some(Identity::new(user)), None)?;
            saved(&session, remove)
                .instrument(info_span!("cli.saved"))
                .await
        }
    }
}

fn session_language(config: &AppConfig, lang: Option<&str>) -> Language {
    lang.map(Language::from_locale)
        .unwrap_or_else(|| configured_language(config))
}

fn open_session_with_identity(
    config: &AppConfig,
    identity: Option<Identity>,
    lang: Option<&str>,
) -> anyhow::Result<(Session, Arc<LocalIdentityProvider>)> {
    let provider = Arc::new(LocalIdentityProvider::new(identity));
    let deps = wire_dependencies(config, provider.clone())?;
    let session = Session::new(deps, session_language(config, lang));
    Ok((session, provider))
}

fn open_session(
    config: &AppConfig,
    identity: Option<Identity>,
    lang: Option<&str>,
) -> anyhow::Result<Session> {
    open_session_with_identity(config, identity, lang).map(|(session, _)| session)
}

async fn load_image(path: &Path) -> anyhow::Result<SourceImage> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let content_type = SourceImage::content_type_for(&file_name);
    Ok(SourceImage::new(file_name, content_type, bytes))
}

/// Upload `path` and merge what the backend recognizes into the session.
async fn recognize_into(session: &Session, path: &Path) -> anyhow::Result<RecognitionOutcome> {
    let image = load_image(path).await?;
    session.set_source_image(image);
    let outcome = session.recognize().await.context("Failed to get ingredients")?;
    info!(?outcome, "recognition finished");
    Ok(outcome)
}

async fn recognize(session: &Session, path: &Path) -> anyhow::Result<()> {
    match recognize_into(session, path).await? {
        RecognitionOutcome::NoFoodDetected => println!("{}", render::NO_FOOD_DETECTED),
        _ => print!("{}", render::ingredients(&session.ingredients())),
    }
    Ok(())
}

fn preferences_from(args: &GenerateArgs) -> anyhow::Result<Preferences> {
    let cuisine = match args.cuisine.as_deref() {
        Some(tag) => match Cuisine::parse(tag) {
            Some(cuisine) => cuisine,
            None => bail!("Unknown cuisine: {tag}"),
        },
        None => Cuisine::Any,
    };
    Ok(Preferences {
        traditional: args.traditional,
        quick_cook: args.quick,
        beginner: args.beginner,
        microwave_only: args.microwave,
        spice_level: SpiceLevel::new(args.spice.unwrap_or(0)),
        cuisine,
        custom_cuisine: args.custom_cuisine.clone().unwrap_or_default(),
    })
}

/// Select exactly the photo ingredients named in `keep`.
fn apply_keep(session: &Session, keep: &[String]) {
    for item in session.ingredients().iter().filter(|i| i.is_from_image()) {
        let wanted = keep.iter().any(|k| k.trim().eq_ignore_ascii_case(&item.name));
        if wanted != item.is_in_use() {
            session.toggle_ingredient(&item.id);
        }
    }
}

async fn generate(
    session: &Session,
    identity: &LocalIdentityProvider,
    args: GenerateArgs,
) -> anyhow::Result<()> {
    let preferences = preferences_from(&args)?;

    for name in &args.ingredients {
        if session.add_ingredient(name).is_none() {
            info!(name = %name, "skipping blank ingredient");
        }
    }
    if let Some(path) = &args.image {
        if recognize_into(session, path).await? == RecognitionOutcome::NoFoodDetected {
            println!("{}", render::NO_FOOD_DETECTED);
        }
        apply_keep(session, &args.keep);
    }
    session.update_preferences(preferences);

    print!("{}", render::ingredients(&session.ingredients()));
    print!("{}", render::preferences(&session.preferences()));
    println!();

    let recipes = match session.generate().await {
        Ok(recipes) => recipes,
        Err(SessionError::Generation(GenerateRecipesError::NothingToSubmit(readiness))) => {
            bail!("{}", render::not_ready(&readiness))
        }
        Err(err) => return Err(err).context("Failed to fetch recipe"),
    };
    print!("{}", render::recipes(&recipes));

    let Some(index) = args.save else {
        return Ok(());
    };
    let Some(recipe) = index.checked_sub(1).and_then(|i| recipes.get(i)) else {
        bail!("No recipe #{index}; got {} recipe(s)", recipes.len());
    };
    if let Some(user) = args.user {
        identity.sign_in(Identity::new(user));
    }
    match session.save_recipe(recipe).await? {
        SaveOutcome::Saved(doc_id) => println!("Saved \"{}\" as {doc_id}", recipe.title),
        SaveOutcome::SignInRequired => println!("{}", render::SIGN_IN_REQUIRED),
    }
    Ok(())
}

async fn saved(session: &Session, remove: Option<String>) -> anyhow::Result<()> {
    session.refresh_saved_recipes().await?;
    if let Some(doc_id) = remove {
        let doc_id = DocId::from(doc_id);
        session
            .remove_saved_recipe(&doc_id)
            .await
            .with_context(|| format!("Failed to remove saved recipe {doc_id}"))?;
        println!("Removed {doc_id}");
    }
    print!("{}", render::saved(&session.saved_recipes().await));
    Ok(())
}
