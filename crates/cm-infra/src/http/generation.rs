use async_trait::async_trait;
use cm_core::ports::{GenerationError, GenerationRequest, RecipeGenerationPort};
use cm_core::Recipe;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::client::BackendClient;

/// `POST /generate-recipe` with a JSON body.
pub struct HttpRecipeGenerator {
    client: BackendClient,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    recipe: Map<String, Value>,
}

impl HttpRecipeGenerator {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

/// Flatten the backend's keyed collection into display order.
///
/// Keys are visited like a JavaScript object: array-index keys in numeric
/// order first, then the remaining keys in document order. Array values are
/// expanded in place.
pub fn flatten_recipes(collection: Map<String, Value>) -> Result<Vec<Recipe>, GenerationError> {
    let (mut indexed, named): (Vec<_>, Vec<_>) = collection
        .into_iter()
        .partition(|(key, _)| array_index(key).is_some());
    indexed.sort_by_key(|(key, _)| array_index(key));

    let mut recipes = Vec::new();
    for (key, value) in indexed.into_iter().chain(named) {
        let items = match value {
            Value::Array(items) => items,
            other => vec![other],
        };
        for item in items {
            let recipe = serde_json::from_value::<Recipe>(item)
                .map_err(|e| GenerationError::Decode(format!("recipe `{key}`: {e}")))?;
            recipes.push(recipe);
        }
    }
    Ok(recipes)
}

fn array_index(key: &str) -> Option<u32> {
    // Canonical form only: "01" is a plain string key.
    let index: u32 = key.parse().ok()?;
    (index.to_string() == key && index < u32::MAX).then_some(index)
}

#[async_trait]
impl RecipeGenerationPort for HttpRecipeGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Recipe>, GenerationError> {
        let url = self.client.endpoint("generate-recipe");
        debug!(%url, ingredients = request.ingredients.len(), "requesting recipes");

        let response = self
            .client
            .http()
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "generation rejected");
            return Err(GenerationError::Rejected {
                status: status.as_u16(),
            });
        }

        let body: GenerationResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Decode(e.to_string()))?;
        flatten_recipes(body.recipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::{Language, Preferences};
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn generator(server: &Server) -> HttpRecipeGenerator {
        let client = BackendClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        HttpRecipeGenerator::new(client)
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            ingredients: vec!["egg".into()],
            preferences: Preferences::default(),
            language: Language::English,
        }
    }

    fn titles(recipes: &[Recipe]) -> Vec<&str> {
        recipes.iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn flatten_expands_arrays_and_keeps_key_order() {
        let collection = json!({
            "breakfast": [{"id": "a", "title": "Omelette"}, {"id": "b", "title": "Shakshuka"}],
            "dinner": {"id": "c", "title": "Fried rice"},
        });
        let Value::Object(map) = collection else { unreachable!() };

        let recipes = flatten_recipes(map).unwrap();
        assert_eq!(titles(&recipes), vec!["Omelette", "Shakshuka", "Fried rice"]);
    }

    #[test]
    fn flatten_puts_index_keys_first_in_numeric_order() {
        let map: Map<String, Value> = serde_json::from_str(
            r#"{"z": {"id":"z","title":"Z"}, "10": {"id":"10","title":"Ten"}, "2": {"id":"2","title":"Two"}}"#,
        )
        .unwrap();

        let recipes = flatten_recipes(map).unwrap();
        assert_eq!(titles(&recipes), vec!["Two", "Ten", "Z"]);
    }

    #[tokio::test]
    async fn posts_json_body_and_flattens_response() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/generate-recipe")
            .match_header("content-type", "application/json")
            .match_body(Matcher::PartialJson(json!({
                "ingredients": ["egg"],
                "language": "English",
                "preferences": {"spiceLevel": 0, "cuisine": "any", "customCuisine": ""}
            })))
            .with_status(200)
            .with_body(
                json!({
                    "recipe": {
                        "recipe1": {
                            "id": "r1",
                            "title": "Tamagoyaki",
                            "ingredients": [{"name": "egg", "portion": "3", "unit": "pcs"}],
                            "additionalIngredients": [{"name": "soy sauce", "portion": "1", "unit": "tsp"}],
                            "instructions": ["Beat", "Roll"],
                            "preference": ["Traditional"]
                        },
                        "recipe2": {"id": "r2", "title": "Egg drop soup"}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let recipes = generator(&server).generate(&request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(titles(&recipes), vec!["Tamagoyaki", "Egg drop soup"]);
        assert_eq!(recipes[0].additional_ingredients[0].name, "soy sauce");
        assert!(recipes.iter().all(|r| r.doc_id.is_none()));
    }

    #[tokio::test]
    async fn error_status_reports_fetch_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/generate-recipe")
            .with_status(503)
            .with_body("upstream timeout")
            .create_async()
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Rejected { status: 503 }));
        assert!(err.to_string().starts_with("Failed to fetch recipe"));
    }

    #[tokio::test]
    async fn missing_recipe_key_is_a_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/generate-recipe")
            .with_status(200)
            .with_body(r#"{"recipes": []}"#)
            .create_async()
            .await;

        let err = generator(&server).generate(&request()).await.unwrap_err();
        assert!(matches!(err, GenerationError::Decode(_)));
    }
}
