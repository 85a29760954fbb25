use cm_core::projection::{self, SubmitReadiness};
use cm_core::{ImageFingerprint, Ingredient, IngredientId, RecognizedIngredient, SourceImage};
use tracing::debug;

/// Working list of candidate ingredients for the current session.
#[derive(Debug, Clone, Default)]
pub struct IngredientStore {
    items: Vec<Ingredient>,
    source_image: Option<SourceImage>,
    source_fingerprint: Option<ImageFingerprint>,
}

impl IngredientStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a manual ingredient.
    ///
    /// Blank input is ignored and returns `None`.
    pub fn add(&mut self, name: &str) -> Option<IngredientId> {
        let ingredient = Ingredient::manual(name)?;
        let id = ingredient.id.clone();
        debug!(ingredient_id = %id, name = %ingredient.name, "ingredient added");
        self.items.push(ingredient);
        Some(id)
    }

    /// Remove by id. Returns `false` when nothing matched.
    pub fn remove(&mut self, id: &IngredientId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| &i.id != id);
        before != self.items.len()
    }

    /// Flip the selection of an image ingredient.
    ///
    /// Unknown ids and manual ingredients are left alone (`false`).
    pub fn toggle_selected(&mut self, id: &IngredientId) -> bool {
        self.items
            .iter_mut()
            .find(|i| &i.id == id)
            .map(|i| i.toggle_selected())
            .unwrap_or(false)
    }

    pub fn replace_all(&mut self, items: Vec<Ingredient>) {
        self.items = items;
    }

    /// Append recognition results after the existing list.
    ///
    /// Records with blank names are skipped. Returns how many were added.
    pub fn merge_recognized(&mut self, records: Vec<RecognizedIngredient>) -> usize {
        let before = self.items.len();
        self.items
            .extend(records.into_iter().filter_map(Ingredient::from_recognized));
        self.items.len() - before
    }

    /// Record the image picked for recognition.
    ///
    /// Supplying the same image again is a no-op and returns `false`.
    pub fn set_source_image(&mut self, image: SourceImage) -> bool {
        let fingerprint = image.fingerprint();
        if self.source_fingerprint.as_ref() == Some(&fingerprint) {
            return false;
        }
        debug!(file = %image.file_name, bytes = image.len(), "source image recorded");
        self.source_fingerprint = Some(fingerprint);
        self.source_image = Some(image);
        true
    }

    pub fn source_image(&self) -> Option<&SourceImage> {
        self.source_image.as_ref()
    }

    pub fn all(&self) -> &[Ingredient] {
        &self.items
    }

    pub fn get(&self, id: &IngredientId) -> Option<&Ingredient> {
        self.items.iter().find(|i| &i.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_image_ingredients(&self) -> bool {
        self.items.iter().any(Ingredient::is_from_image)
    }

    pub fn in_use(&self) -> Vec<&Ingredient> {
        projection::in_use(&self.items)
    }

    pub fn submit_readiness(&self) -> SubmitReadiness {
        projection::submit_readiness(&self.items)
    }
}
