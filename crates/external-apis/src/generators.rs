// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Display names for generator classes
//!
//! Hive reports generator families as slugs, sometimes under several aliases
//! (`dalle`, `dall_e`, `dall-e`). Slugs are compacted to lowercase
//! alphanumerics before the lookup so every alias lands on the same entry.

use std::sync::LazyLock;

use regex::Regex;

// Compile regex once at startup - safe because pattern is static
static SLUG_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[_\-\s.]+").expect("slug separator regex is valid"));

/// Known generator slugs (compacted) and their display names
const GENERATOR_NAMES: &[(&str, &str)] = &[
    ("midjourney", "Midjourney"),
    ("dalle", "DALL-E"),
    ("dalle2", "DALL-E"),
    ("dalle3", "DALL-E"),
    ("stablediffusion", "Stable Diffusion"),
    ("sd", "Stable Diffusion"),
    ("sdxl", "Stable Diffusion XL"),
    ("stablediffusionxl", "Stable Diffusion XL"),
    ("sdxlinpaint", "Stable Diffusion XL"),
    ("stablediffusioninpaint", "Stable Diffusion"),
    ("firefly", "Adobe Firefly"),
    ("adobefirefly", "Adobe Firefly"),
    ("bingimagecreator", "Bing Image Creator"),
    ("flux", "Flux"),
    ("ideogram", "Ideogram"),
    ("imagen", "Google Imagen"),
    ("kandinsky", "Kandinsky"),
    ("leonardo", "Leonardo AI"),
    ("dreamstudio", "DreamStudio"),
    ("deepfloyd", "DeepFloyd IF"),
    ("wuerstchen", "Wuerstchen"),
    ("pixart", "PixArt"),
    ("playground", "Playground"),
    ("gan", "GAN"),
    ("stylegan", "StyleGAN"),
    ("thispersondoesnotexist", "This Person Does Not Exist"),
    ("gpt4o", "GPT-4o"),
    ("sora", "Sora"),
    ("grok", "Grok"),
    ("recraft", "Recraft"),
];

/// Rewrite a provider slug into a display-friendly generator name
///
/// Known slugs use the fixed lookup table; anything else is split on
/// separators and title-cased (`"deep_dream"` becomes `"Deep Dream"`).
pub fn display_name(slug: &str) -> String {
    let compact = compact_slug(slug);
    GENERATOR_NAMES
        .iter()
        .find(|(known, _)| *known == compact)
        .map_or_else(|| humanize(slug), |(_, name)| (*name).to_string())
}

fn compact_slug(slug: &str) -> String {
    slug.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn humanize(slug: &str) -> String {
    let words: Vec<String> = SLUG_SEPARATOR
        .split(slug.trim())
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();

    if words.is_empty() {
        "Unknown generator".to_string()
    } else {
        words.join(" ")
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
