//! A full session wired to the real adapters against a mock backend.

use std::sync::Arc;
use std::time::Duration;

use cm_app::{RecognitionOutcome, SaveOutcome, Session, SessionDeps};
use cm_core::{Identity, Language, SourceImage};
use cm_infra::{
    BackendClient, HttpIngredientRecognizer, HttpRecipeGenerator, ImageCompressor,
    InMemoryRecipeStore, LocalIdentityProvider, SystemClock,
};
use mockito::{Matcher, Server};
use serde_json::json;

fn session(server: &Server, identity: Arc<LocalIdentityProvider>) -> Session {
    let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
    Session::new(
        SessionDeps {
            recognizer: Arc::new(HttpIngredientRecognizer::new(client.clone())),
            generator: Arc::new(HttpRecipeGenerator::new(client)),
            image_preparer: Arc::new(ImageCompressor::default()),
            recipe_repo: Arc::new(InMemoryRecipeStore::new()),
            identity,
            clock: Arc::new(SystemClock),
        },
        Language::English,
    )
}

#[tokio::test]
async fn photo_to_saved_recipe() {
    let mut server = Server::new_async().await;
    let recognize = server
        .mock("POST", "/get-ingredients")
        .with_status(200)
        .with_body(r#"[{"name":"tomato"},{"name":"mozzarella"}]"#)
        .expect(1)
        .create_async()
        .await;
    let generate = server
        .mock("POST", "/generate-recipe")
        .match_body(Matcher::PartialJson(json!({ "ingredients": ["basil", "tomato"] })))
        .with_status(200)
        .with_body(
            json!({ "recipe": { "caprese": { "id": "r-caprese", "title": "Caprese salad" } } })
                .to_string(),
        )
        .expect(1)
        .create_async()
        .await;

    let identity = Arc::new(LocalIdentityProvider::default());
    let session = session(&server, identity.clone());

    session.add_ingredient("basil");
    // Not a decodable image: the compressor fails and the original is sent.
    session.set_source_image(SourceImage::new("plate.jpg", "image/jpeg", b"raw".to_vec()));
    assert_eq!(
        session.recognize().await.unwrap(),
        RecognitionOutcome::Merged { added: 2 }
    );
    assert_eq!(session.recognize().await.unwrap(), RecognitionOutcome::Unchanged);

    let tomato = session
        .ingredients()
        .into_iter()
        .find(|i| i.name == "tomato")
        .unwrap();
    session.toggle_ingredient(&tomato.id);

    let recipes = session.generate().await.unwrap();
    assert_eq!(recipes[0].title, "Caprese salad");

    assert_eq!(
        session.save_recipe(&recipes[0]).await.unwrap(),
        SaveOutcome::SignInRequired
    );

    identity.sign_in(Identity::new("giulia"));
    let SaveOutcome::Saved(doc_id) = session.save_recipe(&recipes[0]).await.unwrap() else {
        panic!("expected recipe to be saved");
    };
    let saved = session.saved_recipes().await;
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].doc_id.as_ref(), Some(&doc_id));

    session.remove_saved_recipe(&doc_id).await.unwrap();
    assert!(session.saved_recipes().await.is_empty());

    recognize.assert_async().await;
    generate.assert_async().await;
}
