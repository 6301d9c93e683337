pub mod analysis;
pub mod composer;
pub mod hashtags;

pub use analysis::ImageAnalysis;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::sync::{Arc, Mutex};

use crate::models::RestaurantContext;
use crate::services::AiBackend;
use analysis::ParsedAnalysis;

/// Ready-made captions for when a photo caption is wanted but no analysis is
/// available at all.
const FALLBACK_CAPTIONS: &[&str] = &[
    "🍽️ Fresh from our kitchen to your table! Every bite tells a story of passion and flavor. #FreshFood #RestaurantLife #Foodie #Delicious #ChefSpecial #LocalDining",
    "👨‍🍳 Our chef's masterpiece is ready to delight your senses. Made with love and the finest ingredients! #ChefSpecial #FineDining #FoodArt #Gourmet #CulinaryExcellence #Handcrafted",
    "🌟 Today's special is more than just a meal - it's an experience! Come taste the difference quality makes. #TodaysSpecial #QualityFood #RestaurantExperience #Foodie #LocalFavorite #Delicious",
    "✨ Every dish is crafted with attention to detail and a sprinkle of culinary magic! #CraftedWithLove #CulinaryMagic #AttentionToDetail #FoodCraftsmanship #Restaurant #Gourmet",
];

/// Ready-made promotional posts, each already carrying hashtags.
const FALLBACK_POSTS: &[&str] = &[
    "🍽️ Fresh ingredients, amazing flavors! Come taste the difference at our restaurant. #FreshFood #LocalDining #RestaurantLife #Foodie #ChefSpecial",
    "👨‍🍳 Our chef's special creations are waiting for you. Book your table today! #ChefSpecial #FineDining #Foodie #CulinaryArt #RestaurantExperience",
    "🌟 Thank you to all our amazing customers! Your support means everything to us. #Grateful #Community #Restaurant #CustomerLove #LocalSupport",
    "🥘 New menu items just dropped! Our latest creations are ready to delight your taste buds. #NewMenu #Innovation #Delicious #FoodieAlert #TasteBuds",
    "📸 Behind the scenes in our kitchen - where the magic happens! #BehindTheScenes #Kitchen #Passion #CulinaryMagic #ChefLife",
    "🎉 Weekend special: Join us for an unforgettable dining experience! #WeekendSpecial #Dining #Experience #RestaurantLife #SpecialOffer",
];

const CONTENT_SYSTEM_PROMPT: &str = "You are a social media expert specializing in restaurant \
marketing. Create engaging, authentic posts that drive customer engagement.";

/// Caption and promotional-content generator. The operating mode is fixed at
/// construction: with a backend it attempts the external call per request and
/// falls back on any failure; without one it serves fallbacks only. Both
/// entry points always return displayable text.
pub struct CaptionGenerator {
    backend: Option<Arc<dyn AiBackend>>,
    rng: Mutex<StdRng>,
}

impl CaptionGenerator {
    pub fn new(backend: Option<Arc<dyn AiBackend>>) -> Self {
        match &backend {
            Some(_) => log::info!("✅ Caption generator initialized (AI-enabled)"),
            None => log::info!("ℹ️ Caption generator initialized (fallback-only, no AI backend)"),
        }

        Self::with_rng(backend, StdRng::from_entropy())
    }

    /// Construction with a caller-supplied random source, for deterministic
    /// tests.
    pub fn with_rng(backend: Option<Arc<dyn AiBackend>>, rng: StdRng) -> Self {
        Self {
            backend,
            rng: Mutex::new(rng),
        }
    }

    pub fn ai_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Turn a photo (or its absence) into an analysis record. Never fails:
    /// disabled mode and missing images yield the default record, transport
    /// errors yield the default record, undecodable replies yield the
    /// heuristic record.
    pub async fn analyze_image(
        &self,
        image_base64: Option<&str>,
        context: &RestaurantContext,
    ) -> ImageAnalysis {
        let (backend, image) = match (&self.backend, image_base64) {
            (Some(backend), Some(image)) => (backend, image),
            _ => return ImageAnalysis::default_analysis(),
        };

        let prompt = analysis::vision_prompt(context);

        match backend.describe_image(&prompt, image).await {
            Ok(reply) => match analysis::extract_analysis(&reply) {
                ParsedAnalysis::Parsed(parsed) => *parsed,
                ParsedAnalysis::Unparseable => {
                    log::warn!("⚠️ Vision reply carried no usable JSON, using heuristic analysis");
                    ImageAnalysis::heuristic_analysis()
                }
            },
            Err(e) => {
                log::error!("❌ Image analysis failed: {}", e);
                ImageAnalysis::default_analysis()
            }
        }
    }

    /// Full pipeline: analyze the image, then compose a caption in the
    /// requested style.
    pub async fn generate_caption_from_image(
        &self,
        image_base64: Option<&str>,
        context: &RestaurantContext,
        style: &str,
    ) -> String {
        let analysis = self.analyze_image(image_base64, context).await;

        let mut rng = self.lock_rng();
        composer::compose(&analysis, context, style, &mut *rng)
    }

    /// Static caption pick for flows that skip image analysis entirely.
    pub fn fallback_caption(&self, context: &RestaurantContext) -> String {
        let mut rng = self.lock_rng();
        let mut caption = FALLBACK_CAPTIONS
            .choose(&mut *rng)
            .copied()
            .unwrap_or_default()
            .to_string();
        drop(rng);

        if let Some(name) = context.name.as_deref().filter(|s| !s.is_empty()) {
            caption.push_str(&format!(" Visit us at {}!", name));
        }

        caption
    }

    /// Produce a short promotional post for the restaurant. AI-enabled mode
    /// asks the text model and appends hashtags only when the reply brought
    /// none of its own; otherwise a static post is picked.
    pub async fn generate_ai_content(&self, context: &RestaurantContext) -> String {
        let mut content = match self.request_promo_text(context).await {
            Some(text) => text,
            None => {
                let mut rng = self.lock_rng();
                FALLBACK_POSTS
                    .choose(&mut *rng)
                    .copied()
                    .unwrap_or_default()
                    .to_string()
            }
        };

        if let Some(name) = context.name.as_deref().filter(|s| !s.is_empty()) {
            content.push_str(&format!(" Visit us at {}!", name));
        }

        content
    }

    async fn request_promo_text(&self, context: &RestaurantContext) -> Option<String> {
        let backend = self.backend.as_ref()?;

        let prompt = format!(
            "Generate an engaging social media post for a restaurant with the following context:\n\
             Restaurant Name: {}\n\
             Cuisine Type: {}\n\
             Location: {}\n\
             \n\
             Create a post that could be about:\n\
             - Daily specials or menu highlights\n\
             - Restaurant atmosphere and experience\n\
             - Chef recommendations\n\
             - Customer appreciation\n\
             - Behind-the-scenes content\n\
             - Seasonal ingredients or dishes\n\
             \n\
             Make it engaging, authentic, and include relevant hashtags. \
             Keep it under 280 characters for optimal social media engagement.",
            context.name(),
            context.cuisine(),
            context.location(),
        );

        match backend.complete_text(CONTENT_SYSTEM_PROMPT, &prompt).await {
            Ok(reply) => {
                let mut content = reply.trim().to_string();

                if !content.contains('#') {
                    let cuisine = context.cuisine().to_lowercase();
                    let stub = ImageAnalysis::stub("restaurant content", context.cuisine());
                    let mut rng = self.lock_rng();
                    let tags = hashtags::assemble(&cuisine, &stub, context, &mut *rng);
                    content.push_str(&format!("\n\n{}", tags));
                }

                Some(content)
            }
            Err(e) => {
                log::error!("❌ AI content generation failed: {}", e);
                None
            }
        }
    }

    fn lock_rng(&self) -> std::sync::MutexGuard<'_, StdRng> {
        self.rng.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend that returns a canned reply and counts how often it was hit.
    struct ScriptedBackend {
        reply: String,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedBackend {
        fn new(reply: &str) -> (Arc<Self>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let backend = Arc::new(Self {
                reply: reply.to_string(),
                calls: calls.clone(),
            });
            (backend, calls)
        }
    }

    #[async_trait::async_trait]
    impl AiBackend for ScriptedBackend {
        async fn describe_image(&self, _prompt: &str, _image_base64: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }

        async fn complete_text(&self, _system: &str, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    struct FailingBackend;

    #[async_trait::async_trait]
    impl AiBackend for FailingBackend {
        async fn describe_image(&self, _prompt: &str, _image_base64: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }

        async fn complete_text(&self, _system: &str, _prompt: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    fn seeded(backend: Option<Arc<dyn AiBackend>>) -> CaptionGenerator {
        CaptionGenerator::with_rng(backend, StdRng::seed_from_u64(12345))
    }

    #[tokio::test]
    async fn test_disabled_mode_still_produces_caption() {
        let generator = seeded(None);
        let caption = generator
            .generate_caption_from_image(None, &RestaurantContext::default(), "engaging")
            .await;

        assert!(!caption.is_empty());
        // Disabled mode serves the default analysis
        assert!(caption.to_lowercase().contains("chef's special"));
    }

    #[tokio::test]
    async fn test_missing_image_never_calls_backend() {
        let (backend, calls) = ScriptedBackend::new("{}");
        let generator = seeded(Some(backend));

        let caption = generator
            .generate_caption_from_image(None, &RestaurantContext::default(), "engaging")
            .await;

        assert!(!caption.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parsed_analysis_drives_caption() {
        let (backend, calls) = ScriptedBackend::new(
            r#"Sure! {"main_dish": "shakshuka", "cuisine_type": "mediterranean", "mood": "cozy"}"#,
        );
        let generator = seeded(Some(backend));

        let caption = generator
            .generate_caption_from_image(Some("AAAA"), &RestaurantContext::default(), "casual")
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(caption.to_lowercase().contains("shakshuka"));
    }

    #[tokio::test]
    async fn test_braceless_reply_yields_heuristic_analysis() {
        let (backend, _) = ScriptedBackend::new("A lovely plate of food, no JSON here.");
        let generator = seeded(Some(backend));

        let analysis = generator
            .analyze_image(Some("AAAA"), &RestaurantContext::default())
            .await;

        assert_eq!(analysis.main_dish, "Delicious dish");
    }

    #[tokio::test]
    async fn test_backend_error_yields_default_analysis() {
        let generator = seeded(Some(Arc::new(FailingBackend)));

        let analysis = generator
            .analyze_image(Some("AAAA"), &RestaurantContext::default())
            .await;

        assert_eq!(analysis.main_dish, "Chef's special");
    }

    #[tokio::test]
    async fn test_content_fallback_pool_and_visit_us() {
        let context = RestaurantContext {
            name: Some("Casa Roma".to_string()),
            ..Default::default()
        };
        let generator = seeded(None);

        for _ in 0..20 {
            let content = generator.generate_ai_content(&context).await;
            let base = content
                .strip_suffix(" Visit us at Casa Roma!")
                .expect("missing visit-us suffix");
            assert!(FALLBACK_POSTS.contains(&base));
        }
    }

    #[tokio::test]
    async fn test_content_appends_hashtags_only_when_absent() {
        let context = RestaurantContext {
            cuisine: Some("Italian".to_string()),
            ..Default::default()
        };

        let (backend, _) = ScriptedBackend::new("  Come taste our new autumn menu!  ");
        let generator = seeded(Some(backend));
        let content = generator.generate_ai_content(&context).await;
        let (body, tags) = content.rsplit_once("\n\n").expect("hashtags not appended");
        assert_eq!(body, "Come taste our new autumn menu!");
        assert!(tags.split(' ').all(|t| t.starts_with('#')));

        let (backend, _) = ScriptedBackend::new("Already tagged! #foodie");
        let generator = seeded(Some(backend));
        let content = generator.generate_ai_content(&context).await;
        assert_eq!(content, "Already tagged! #foodie");
    }

    #[tokio::test]
    async fn test_content_backend_error_falls_back() {
        let generator = seeded(Some(Arc::new(FailingBackend)));
        let content = generator
            .generate_ai_content(&RestaurantContext::default())
            .await;
        assert!(FALLBACK_POSTS.contains(&content.as_str()));
    }

    #[test]
    fn test_fallback_caption_pool() {
        let context = RestaurantContext {
            name: Some("Tony's Bistro".to_string()),
            ..Default::default()
        };
        let generator = seeded(None);

        for _ in 0..20 {
            let caption = generator.fallback_caption(&context);
            let base = caption
                .strip_suffix(" Visit us at Tony's Bistro!")
                .expect("missing visit-us suffix");
            assert!(FALLBACK_CAPTIONS.contains(&base));
        }
    }
}
