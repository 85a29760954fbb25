use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use cm_core::ports::{ImagePreparePort, IngredientRecognitionPort};
use cm_core::{ImageFingerprint, Language, RecognizedIngredient, SourceImage};
use tracing::{info, info_span, warn, Instrument};

use crate::request_cache::{FetchError, RequestCache, RequestState};

/// Memoization key of a recognition call.
///
/// One call per distinct image. The language in effect on the first call is
/// the one sent; switching language later does not recognize the image again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecognitionKey {
    pub image: ImageFingerprint,
}

impl RecognitionKey {
    pub fn new(image: &SourceImage) -> Self {
        Self {
            image: image.fingerprint(),
        }
    }
}

/// Resolved recognition for one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Recognition {
    pub key: RecognitionKey,
    pub ingredients: Vec<RecognizedIngredient>,
    /// `true` only for the first caller that receives this key's result.
    /// Later callers get the same records but must not merge them again.
    pub first_delivery: bool,
}

/// Use case: detect ingredients on the session image.
/// 用例：识别图片中的食材。
pub struct RecognizeIngredients {
    recognizer: Arc<dyn IngredientRecognitionPort>,
    preparer: Arc<dyn ImagePreparePort>,
    cache: RequestCache<RecognitionKey, Vec<RecognizedIngredient>>,
    delivered: Mutex<HashSet<RecognitionKey>>,
}

impl RecognizeIngredients {
    pub fn new(
        recognizer: Arc<dyn IngredientRecognitionPort>,
        preparer: Arc<dyn ImagePreparePort>,
    ) -> Self {
        Self {
            recognizer,
            preparer,
            cache: RequestCache::new("recognition"),
            delivered: Mutex::new(HashSet::new()),
        }
    }

    /// Resolve recognition for `image` in `language`.
    ///
    /// The recognition service is called at most once per image, even across
    /// concurrent or abandoned callers.
    pub async fn execute(
        &self,
        image: &SourceImage,
        language: Language,
    ) -> Result<Recognition, FetchError> {
        let key = RecognitionKey::new(image);
        let span = info_span!(
            "usecase.recognize_ingredients.execute",
            image = %key.image.as_str(),
            language = %language,
        );

        async {
            let recognizer = self.recognizer.clone();
            let preparer = self.preparer.clone();
            let upload = image.clone();

            let ingredients = self
                .cache
                .get_or_fetch(key.clone(), move || async move {
                    let prepared = match preparer.prepare(&upload).await {
                        Ok(prepared) => prepared,
                        Err(err) => {
                            warn!(error = %err, "image preparation failed, sending original");
                            upload
                        }
                    };
                    info!(bytes = prepared.len(), "sending image for recognition");
                    recognizer
                        .recognize(&prepared, language)
                        .await
                        .map_err(FetchError::failed)
                })
                .await?;

            let first_delivery = self
                .delivered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(key.clone());
            info!(count = ingredients.len(), first_delivery, "recognition resolved");

            Ok(Recognition {
                key,
                ingredients,
                first_delivery,
            })
        }
        .instrument(span)
        .await
    }

    pub fn state(&self, key: &RecognitionKey) -> RequestState<Vec<RecognizedIngredient>> {
        self.cache.state(key)
    }

    /// Clear a failed recognition so the next call asks the service again.
    pub fn retry(&self, key: &RecognitionKey) -> bool {
        self.cache.retry(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cm_core::ports::{ImagePrepareError, RecognitionError};
    use mockall::mock;

    mock! {
        Recognizer {}

        #[async_trait]
        impl IngredientRecognitionPort for Recognizer {
            async fn recognize(
                &self,
                image: &SourceImage,
                language: Language,
            ) -> Result<Vec<RecognizedIngredient>, RecognitionError>;
        }
    }

    mock! {
        Preparer {}

        #[async_trait]
        impl ImagePreparePort for Preparer {
            async fn prepare(&self, image: &SourceImage) -> Result<SourceImage, ImagePrepareError>;
        }
    }

    fn photo() -> SourceImage {
        SourceImage::new("fridge.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3])
    }

    fn passthrough() -> MockPreparer {
        let mut preparer = MockPreparer::new();
        preparer.expect_prepare().returning(|img| Ok(img.clone()));
        preparer
    }

    #[tokio::test]
    async fn same_image_and_language_is_recognized_once() {
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .times(1)
            .returning(|_, _| Ok(vec![RecognizedIngredient::named("egg")]));
        let uc = RecognizeIngredients::new(Arc::new(recognizer), Arc::new(passthrough()));

        let first = uc.execute(&photo(), Language::English).await.unwrap();
        let second = uc.execute(&photo(), Language::English).await.unwrap();

        assert!(first.first_delivery);
        assert!(!second.first_delivery);
        assert_eq!(first.ingredients, second.ingredients);
    }

    #[tokio::test]
    async fn language_change_does_not_recognize_the_same_image_again() {
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .times(1)
            .returning(|_, lang| Ok(vec![RecognizedIngredient::named(lang.locale())]));
        let uc = RecognizeIngredients::new(Arc::new(recognizer), Arc::new(passthrough()));

        let en = uc.execute(&photo(), Language::English).await.unwrap();
        let ja = uc.execute(&photo(), Language::Japanese).await.unwrap();

        assert_eq!(en.ingredients[0].name, "en");
        assert_eq!(ja.ingredients, en.ingredients);
        assert!(en.first_delivery);
        assert!(!ja.first_delivery);
    }

    #[tokio::test]
    async fn a_different_image_is_recognized() {
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .times(2)
            .returning(|img, _| Ok(vec![RecognizedIngredient::named(img.file_name.clone())]));
        let uc = RecognizeIngredients::new(Arc::new(recognizer), Arc::new(passthrough()));
        let other = SourceImage::new("pantry.png", "image/png", vec![0x89, b'P', b'N', b'G']);

        let first = uc.execute(&photo(), Language::English).await.unwrap();
        let second = uc.execute(&other, Language::English).await.unwrap();

        assert!(first.first_delivery && second.first_delivery);
        assert_eq!(second.ingredients[0].name, "pantry.png");
    }

    #[tokio::test]
    async fn preparation_failure_falls_back_to_original() {
        let mut preparer = MockPreparer::new();
        preparer
            .expect_prepare()
            .returning(|_| Err(ImagePrepareError::Decode("truncated".into())));
        let mut recognizer = MockRecognizer::new();
        recognizer
            .expect_recognize()
            .withf(|img, _| img.file_name == "fridge.jpg" && img.len() == 7)
            .times(1)
            .returning(|_, _| Ok(vec![]));
        let uc = RecognizeIngredients::new(Arc::new(recognizer), Arc::new(preparer));

        let result = uc.execute(&photo(), Language::English).await.unwrap();
        assert!(result.ingredients.is_empty());
    }

    #[tokio::test]
    async fn failure_is_sticky_until_retry() {
        let mut recognizer = MockRecognizer::new();
        let mut calls = 0;
        recognizer.expect_recognize().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(RecognitionError::Rejected {
                    status: 500,
                    message: "model overloaded".into(),
                })
            } else {
                Ok(vec![RecognizedIngredient::named("leek")])
            }
        });
        let uc = RecognizeIngredients::new(Arc::new(recognizer), Arc::new(passthrough()));
        let key = RecognitionKey::new(&photo());

        assert!(uc.execute(&photo(), Language::English).await.is_err());
        assert!(uc.execute(&photo(), Language::English).await.is_err());
        assert!(matches!(uc.state(&key), RequestState::Failed(_)));

        assert!(uc.retry(&key));
        let recovered = uc.execute(&photo(), Language::English).await.unwrap();
        assert!(recovered.first_delivery);
        assert_eq!(recovered.ingredients[0].name, "leek");
    }
}
