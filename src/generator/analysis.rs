use serde::{Deserialize, Serialize};

use crate::models::RestaurantContext;

/// Structured description of a food photo, produced per request and used to
/// drive caption text. Never partially populated: deserialization fills any
/// missing field with the default-analysis value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageAnalysis {
    #[serde(default = "default_main_dish")]
    pub main_dish: String,
    #[serde(default = "default_cuisine_type")]
    pub cuisine_type: String,
    #[serde(default = "default_cooking_style")]
    pub cooking_style: String,
    #[serde(default = "default_visual_elements")]
    pub visual_elements: Vec<String>,
    #[serde(default = "default_ingredients")]
    pub ingredients: Vec<String>,
    #[serde(default = "default_dining_context")]
    pub dining_context: String,
    #[serde(default = "default_mood")]
    pub mood: String,
    #[serde(default = "default_appeal_factors")]
    pub appeal_factors: Vec<String>,
}

fn default_main_dish() -> String {
    "Chef's special".to_string()
}

fn default_cuisine_type() -> String {
    "gourmet".to_string()
}

fn default_cooking_style() -> String {
    "artfully crafted".to_string()
}

fn default_visual_elements() -> Vec<String> {
    vec![
        "beautiful presentation".to_string(),
        "vibrant colors".to_string(),
    ]
}

fn default_ingredients() -> Vec<String> {
    vec!["premium ingredients".to_string()]
}

fn default_dining_context() -> String {
    "fine dining".to_string()
}

fn default_mood() -> String {
    "elegant".to_string()
}

fn default_appeal_factors() -> Vec<String> {
    vec![
        "exceptional quality".to_string(),
        "artistic plating".to_string(),
    ]
}

impl ImageAnalysis {
    /// Analysis used when the vision service is disabled, no image was
    /// supplied, or the call itself failed.
    pub fn default_analysis() -> Self {
        Self {
            main_dish: default_main_dish(),
            cuisine_type: default_cuisine_type(),
            cooking_style: default_cooking_style(),
            visual_elements: default_visual_elements(),
            ingredients: default_ingredients(),
            dining_context: default_dining_context(),
            mood: default_mood(),
            appeal_factors: default_appeal_factors(),
        }
    }

    /// Analysis used when the service answered but the reply carried no
    /// decodable JSON. Distinct from `default_analysis` so the two failure
    /// tiers stay observable.
    pub fn heuristic_analysis() -> Self {
        Self {
            main_dish: "Delicious dish".to_string(),
            cuisine_type: "international".to_string(),
            cooking_style: "expertly prepared".to_string(),
            visual_elements: vec![
                "beautifully plated".to_string(),
                "colorful presentation".to_string(),
            ],
            ingredients: vec!["fresh ingredients".to_string()],
            dining_context: "restaurant dining".to_string(),
            mood: "appetizing".to_string(),
            appeal_factors: vec![
                "visual appeal".to_string(),
                "fresh preparation".to_string(),
            ],
        }
    }

    /// Minimal record for content that has no photo behind it. The empty
    /// fields resolve to the composer's own defaults.
    pub fn stub(main_dish: &str, cuisine_type: &str) -> Self {
        Self {
            main_dish: main_dish.to_string(),
            cuisine_type: cuisine_type.to_string(),
            cooking_style: String::new(),
            visual_elements: Vec::new(),
            ingredients: Vec::new(),
            dining_context: String::new(),
            mood: String::new(),
            appeal_factors: Vec::new(),
        }
    }
}

/// Outcome of scanning a free-text model reply for an analysis object.
#[derive(Debug)]
pub enum ParsedAnalysis {
    Parsed(Box<ImageAnalysis>),
    Unparseable,
}

/// Locate the first `{` and the last `}` in `text` and decode whatever sits
/// between them. Vision models wrap their JSON in prose often enough that
/// this cannot assume a clean payload.
pub fn extract_analysis(text: &str) -> ParsedAnalysis {
    let start = match text.find('{') {
        Some(i) => i,
        None => return ParsedAnalysis::Unparseable,
    };
    let end = match text.rfind('}') {
        Some(i) if i >= start => i,
        _ => return ParsedAnalysis::Unparseable,
    };

    match serde_json::from_str::<ImageAnalysis>(&text[start..=end]) {
        Ok(analysis) => ParsedAnalysis::Parsed(Box::new(analysis)),
        Err(e) => {
            log::debug!("Could not decode analysis JSON: {}", e);
            ParsedAnalysis::Unparseable
        }
    }
}

/// Prompt sent alongside the photo. Embeds the restaurant context and pins
/// the reply to the `ImageAnalysis` field set.
pub fn vision_prompt(context: &RestaurantContext) -> String {
    format!(
        "Analyze this food image and provide detailed information for social media caption generation.\n\
         \n\
         Restaurant Context:\n\
         - Name: {}\n\
         - Cuisine: {}\n\
         - Style: {}\n\
         - Location: {}\n\
         \n\
         Please identify:\n\
         1. Main dish/food items\n\
         2. Cooking style/preparation method\n\
         3. Visual appeal elements (colors, presentation, garnishes)\n\
         4. Estimated cuisine type\n\
         5. Dining context (casual, fine dining, etc.)\n\
         6. Key ingredients visible\n\
         7. Overall mood/atmosphere\n\
         \n\
         Respond in JSON format with these fields:\n\
         - main_dish: string\n\
         - cuisine_type: string\n\
         - cooking_style: string\n\
         - visual_elements: array of strings\n\
         - ingredients: array of strings\n\
         - dining_context: string\n\
         - mood: string\n\
         - appeal_factors: array of strings",
        context.name(),
        context.cuisine(),
        context.style(),
        context.location(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_clean_json() {
        let text = r#"{"main_dish": "Margherita pizza", "cuisine_type": "Italian", "mood": "rustic"}"#;

        match extract_analysis(text) {
            ParsedAnalysis::Parsed(analysis) => {
                assert_eq!(analysis.main_dish, "Margherita pizza");
                assert_eq!(analysis.cuisine_type, "Italian");
                assert_eq!(analysis.mood, "rustic");
                // Unlisted fields come back as the default-analysis constants
                assert_eq!(analysis.cooking_style, "artfully crafted");
                assert_eq!(analysis.ingredients, vec!["premium ingredients"]);
            }
            ParsedAnalysis::Unparseable => panic!("expected parsed analysis"),
        }
    }

    #[test]
    fn test_extract_from_prose_wrapped_json() {
        let text = "Here is my analysis of the photo:\n\
                    {\"main_dish\": \"ramen\", \"cuisine_type\": \"asian\"}\n\
                    Hope this helps!";

        match extract_analysis(text) {
            ParsedAnalysis::Parsed(analysis) => assert_eq!(analysis.main_dish, "ramen"),
            ParsedAnalysis::Unparseable => panic!("expected parsed analysis"),
        }
    }

    #[test]
    fn test_extract_without_braces() {
        let text = "The dish appears to be a pasta with tomato sauce.";
        assert!(matches!(extract_analysis(text), ParsedAnalysis::Unparseable));
    }

    #[test]
    fn test_extract_with_broken_json() {
        let text = "{this is not json}";
        assert!(matches!(extract_analysis(text), ParsedAnalysis::Unparseable));
    }

    #[test]
    fn test_extract_brace_order() {
        // '}' before '{' leaves nothing decodable between them
        let text = "} nothing here {";
        assert!(matches!(extract_analysis(text), ParsedAnalysis::Unparseable));
    }

    #[test]
    fn test_default_and_heuristic_are_distinct() {
        assert_eq!(ImageAnalysis::default_analysis().main_dish, "Chef's special");
        assert_eq!(ImageAnalysis::heuristic_analysis().main_dish, "Delicious dish");
    }

    #[test]
    fn test_vision_prompt_embeds_context_defaults() {
        let prompt = vision_prompt(&RestaurantContext::default());
        assert!(prompt.contains("- Name: Our Restaurant"));
        assert!(prompt.contains("- Cuisine: International"));
        assert!(prompt.contains("- Style: Casual Dining"));
        assert!(prompt.contains("- Location: Local"));
    }
}
