//! Session context.
//!
//! One [`Session`] per user session. It owns the ingredient and preference
//! stores, the saved recipe collection and the memoized backend calls, and
//! is the only surface a front end talks to.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cm_core::ports::{GenerationRequest, IdentityError, IdentityPort, RecipeRepositoryPort};
use cm_core::{
    DocId, Identity, Ingredient, IngredientId, Language, PreferenceToggle, Preferences, Recipe,
    RecognizedIngredient, SourceImage, SubmitReadiness,
};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::deps::SessionDeps;
use crate::events::SessionEvent;
use crate::request_cache::{FetchError, RequestState};
use crate::stores::{
    IngredientStore, PreferencesStore, RecipeCollection, RecipeCollectionError, SaveOutcome,
};
use crate::usecases::{
    GenerateRecipes, GenerateRecipesError, RecognitionKey, RecognizeIngredients, SavedRecipesFeed,
};

const EVENT_CAPACITY: usize = 32;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no image has been uploaded")]
    NoSourceImage,

    #[error("recognition failed: {0}")]
    Recognition(#[source] FetchError),

    #[error(transparent)]
    Generation(#[from] GenerateRecipesError),

    #[error(transparent)]
    Recipes(#[from] RecipeCollectionError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// What a recognition pass did to the ingredient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// New image ingredients were appended.
    Merged { added: usize },
    /// The result for this image was merged earlier.
    Unchanged,
    /// The service found nothing; the list is untouched.
    NoFoodDetected,
}

/// The session state container.
/// 会话状态容器。
pub struct Session {
    ingredients: Mutex<IngredientStore>,
    preferences: Mutex<PreferencesStore>,
    language: Mutex<Language>,
    generated: Mutex<Vec<Recipe>>,
    recipes: Arc<RecipeCollection>,
    recognize: RecognizeIngredients,
    generate: GenerateRecipes,
    recipe_repo: Arc<dyn RecipeRepositoryPort>,
    identity: Arc<dyn IdentityPort>,
    events: broadcast::Sender<SessionEvent>,
    feed: Mutex<Option<SavedRecipesFeed>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(deps: SessionDeps, language: Language) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let recipes = Arc::new(RecipeCollection::new(
            deps.recipe_repo.clone(),
            deps.identity.clone(),
            deps.clock,
        ));

        Self {
            ingredients: Mutex::new(IngredientStore::new()),
            preferences: Mutex::new(PreferencesStore::new()),
            language: Mutex::new(language),
            generated: Mutex::new(Vec::new()),
            recipes,
            recognize: RecognizeIngredients::new(deps.recognizer, deps.image_preparer),
            generate: GenerateRecipes::new(deps.generator),
            recipe_repo: deps.recipe_repo,
            identity: deps.identity,
            events,
            feed: Mutex::new(None),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        // No receivers is fine.
        let _ = self.events.send(event);
    }

    // ---- ingredients ----

    pub fn add_ingredient(&self, name: &str) -> Option<IngredientId> {
        lock(&self.ingredients).add(name)
    }

    pub fn remove_ingredient(&self, id: &IngredientId) -> bool {
        lock(&self.ingredients).remove(id)
    }

    pub fn toggle_ingredient(&self, id: &IngredientId) -> bool {
        lock(&self.ingredients).toggle_selected(id)
    }

    pub fn replace_ingredients(&self, items: Vec<Ingredient>) {
        lock(&self.ingredients).replace_all(items);
    }

    pub fn ingredients(&self) -> Vec<Ingredient> {
        lock(&self.ingredients).all().to_vec()
    }

    pub fn in_use_ingredients(&self) -> Vec<Ingredient> {
        lock(&self.ingredients).in_use().into_iter().cloned().collect()
    }

    pub fn submit_readiness(&self) -> SubmitReadiness {
        lock(&self.ingredients).submit_readiness()
    }

    /// Record the upload to recognize. Returns `false` for the image already held.
    pub fn set_source_image(&self, image: SourceImage) -> bool {
        lock(&self.ingredients).set_source_image(image)
    }

    pub fn source_image(&self) -> Option<SourceImage> {
        lock(&self.ingredients).source_image().cloned()
    }

    // ---- preferences and language ----

    pub fn preferences(&self) -> Preferences {
        lock(&self.preferences).current().clone()
    }

    pub fn update_preferences(&self, preferences: Preferences) {
        lock(&self.preferences).update(preferences);
    }

    pub fn toggle_preference(&self, toggle: PreferenceToggle) {
        lock(&self.preferences).toggle(toggle);
    }

    pub fn reset_preferences(&self) {
        lock(&self.preferences).reset();
    }

    pub fn language(&self) -> Language {
        *lock(&self.language)
    }

    pub fn set_language(&self, language: Language) {
        *lock(&self.language) = language;
    }

    // ---- recognition ----

    fn recognition_key(&self) -> Option<RecognitionKey> {
        let image = lock(&self.ingredients).source_image().cloned()?;
        Some(RecognitionKey::new(&image))
    }

    /// Recognize ingredients on the uploaded image and merge them once.
    ///
    /// Each image is sent once, in the language current at that time.
    pub async fn recognize(&self) -> Result<RecognitionOutcome, SessionError> {
        let image = self.source_image().ok_or(SessionError::NoSourceImage)?;
        let recognition = self
            .recognize
            .execute(&image, self.language())
            .await
            .map_err(SessionError::Recognition)?;

        if recognition.ingredients.is_empty() {
            info!("no food detected");
            return Ok(RecognitionOutcome::NoFoodDetected);
        }
        if !recognition.first_delivery {
            return Ok(RecognitionOutcome::Unchanged);
        }

        let added = self.merge_recognized(recognition.ingredients);
        Ok(RecognitionOutcome::Merged { added })
    }

    fn merge_recognized(&self, records: Vec<RecognizedIngredient>) -> usize {
        lock(&self.ingredients).merge_recognized(records)
    }

    pub fn recognition_state(&self) -> RequestState<Vec<RecognizedIngredient>> {
        match self.recognition_key() {
            Some(key) => self.recognize.state(&key),
            None => RequestState::Idle,
        }
    }

    pub fn retry_recognition(&self) -> bool {
        self.recognition_key()
            .map(|key| self.recognize.retry(&key))
            .unwrap_or(false)
    }

    // ---- generation ----

    fn generation_request(&self) -> Result<GenerationRequest, SubmitReadiness> {
        let ingredients = self.ingredients();
        let preferences = self.preferences();
        GenerateRecipes::request_for(&ingredients, &preferences, self.language())
    }

    /// Generate recipes for the in-use ingredients and current preferences.
    pub async fn generate(&self) -> Result<Vec<Recipe>, SessionError> {
        let request = self
            .generation_request()
            .map_err(GenerateRecipesError::NothingToSubmit)?;
        let recipes = self.generate.execute_request(request).await?;
        *lock(&self.generated) = recipes.clone();
        Ok(recipes)
    }

    /// Recipes from the last successful generation.
    pub fn generated_recipes(&self) -> Vec<Recipe> {
        lock(&self.generated).clone()
    }

    pub fn generation_state(&self) -> RequestState<Vec<Recipe>> {
        match self.generation_request() {
            Ok(request) => self.generate.state(&request),
            Err(_) => RequestState::Idle,
        }
    }

    pub fn retry_generation(&self) -> bool {
        self.generation_request()
            .map(|request| self.generate.retry(&request))
            .unwrap_or(false)
    }

    // ---- saved recipes ----

    /// Save a recipe for the signed-in user.
    ///
    /// Without an identity nothing is written and
    /// [`SessionEvent::SignInRequired`] is emitted.
    pub async fn save_recipe(&self, recipe: &Recipe) -> Result<SaveOutcome, SessionError> {
        let outcome = self.recipes.save(recipe).await?;
        if outcome == SaveOutcome::SignInRequired {
            self.emit(SessionEvent::SignInRequired);
        }
        Ok(outcome)
    }

    pub async fn remove_saved_recipe(&self, doc_id: &DocId) -> Result<(), SessionError> {
        self.recipes.remove(doc_id).await?;
        Ok(())
    }

    pub async fn saved_recipes(&self) -> Vec<Recipe> {
        self.recipes.list().await
    }

    pub async fn refresh_saved_recipes(&self) -> Result<(), SessionError> {
        self.recipes.refresh().await?;
        Ok(())
    }

    /// Follow the identity's saved recipes live. Restarts an existing feed.
    pub fn start_saved_feed(&self) {
        let feed = SavedRecipesFeed::start(
            self.recipe_repo.clone(),
            self.identity.clone(),
            self.recipes.clone(),
            self.events.clone(),
        );
        *lock(&self.feed) = Some(feed);
    }

    pub fn stop_saved_feed(&self) {
        lock(&self.feed).take();
    }

    fn feed_running(&self) -> bool {
        lock(&self.feed).as_ref().is_some_and(SavedRecipesFeed::is_running)
    }

    // ---- identity ----

    pub fn current_identity(&self) -> Option<Identity> {
        self.identity.current()
    }

    /// Sign out and send the user to sign-in.
    pub async fn sign_out(&self) -> Result<(), SessionError> {
        self.identity.sign_out().await?;
        // A running feed observes the change and reports it itself.
        if !self.feed_running() {
            if let Err(err) = self.recipes.refresh().await {
                warn!(error = %err, "failed to clear saved recipes after sign-out");
            }
            self.emit(SessionEvent::SignInRequired);
        }
        Ok(())
    }
}
