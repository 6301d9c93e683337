use rand::seq::SliceRandom;
use rand::Rng;

use super::analysis::ImageAnalysis;
use super::hashtags;
use crate::models::RestaurantContext;

/// Compose a caption for `analysis` in the requested style, ending with a
/// hashtag line. Unknown styles fall back to `engaging`. Total: every missing
/// field degrades to a stock phrase instead of failing.
pub fn compose(
    analysis: &ImageAnalysis,
    context: &RestaurantContext,
    style: &str,
    rng: &mut impl Rng,
) -> String {
    let cuisine_type = resolve(&analysis.cuisine_type, "international").to_lowercase();

    let templates = build_templates(style, analysis);
    let mut body = templates
        .choose(rng)
        .cloned()
        .unwrap_or_default();

    if let Some(name) = context.name.as_deref().filter(|s| !s.is_empty()) {
        body.push_str(&format!(" Visit us at {}!", name));
    }

    let tags = hashtags::assemble(&cuisine_type, analysis, context, rng);

    format!("{}\n\n{}", body, tags)
}

/// Expand every template of `style` for this analysis. The chosen caption is
/// always one of these, which keeps the output space enumerable for a fixed
/// input.
fn build_templates(style: &str, analysis: &ImageAnalysis) -> Vec<String> {
    let main_dish = resolve(&analysis.main_dish, "our signature dish");
    let mood = resolve(&analysis.mood, "delicious");
    let visual = visual_description(&analysis.visual_elements);
    let appeal = appeal_description(analysis);
    let mood_desc = mood_description(mood);
    let ingredients = format_ingredients(&analysis.ingredients);

    match style {
        "professional" => vec![
            format!(
                "Expertly crafted {} featuring {}. {}",
                main_dish, ingredients, visual
            ),
            format!(
                "Our signature {} - a testament to culinary excellence. {}",
                main_dish, appeal
            ),
            format!(
                "Artisanal {} prepared with meticulous attention to detail. {}",
                main_dish, visual
            ),
        ],
        "casual" => vec![
            format!(
                "😋 {} looking absolutely amazing! {}",
                title_case(main_dish),
                visual
            ),
            format!("🤤 Can't get enough of this {}! {}", main_dish, mood_desc),
            format!("📸 Had to share this gorgeous {}! {}", main_dish, visual),
        ],
        // "engaging" and anything unrecognized
        _ => vec![
            format!(
                "🍽️ {} - where {} meets perfection! {} Made with {}.",
                title_case(main_dish),
                mood,
                visual,
                ingredients
            ),
            format!(
                "✨ Presenting our {}! {} Every bite is a celebration of flavor.",
                main_dish, appeal
            ),
            format!(
                "👨‍🍳 Chef's masterpiece: {}! {} Crafted with passion and {}.",
                main_dish, visual, ingredients
            ),
            format!(
                "🌟 {} that speaks to your soul! {} {}",
                title_case(main_dish),
                mood_desc,
                visual
            ),
        ],
    }
}

fn resolve<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn visual_description(visual_elements: &[String]) -> String {
    match visual_elements {
        [] => "Beautifully presented with artistic flair.".to_string(),
        [one] => format!("Notice the {}.", one),
        [a, b] => format!("Love the {} and {}.", a, b),
        [rest @ .., last] => format!("Featuring {}, and {}.", rest.join(", "), last),
    }
}

fn appeal_description(analysis: &ImageAnalysis) -> String {
    let factors = &analysis.appeal_factors;
    if factors.is_empty() {
        return "A true feast for the senses.".to_string();
    }
    let shown = &factors[..factors.len().min(2)];
    format!("Showcasing {}.", shown.join(", "))
}

fn mood_description(mood: &str) -> &'static str {
    match mood.to_lowercase().as_str() {
        "elegant" => "Sophisticated and refined.",
        "appetizing" => "Making mouths water everywhere!",
        "cozy" => "Perfect comfort food vibes.",
        "vibrant" => "Bursting with color and life!",
        "rustic" => "Authentic and hearty goodness.",
        "delicious" => "Pure culinary bliss!",
        _ => "Absolutely irresistible!",
    }
}

fn format_ingredients(ingredients: &[String]) -> String {
    match ingredients {
        [] => "the finest ingredients".to_string(),
        [one] => one.clone(),
        [a, b] => format!("{} and {}", a, b),
        [rest @ .., last] => format!("{}, and {}", rest.join(", "), last),
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
