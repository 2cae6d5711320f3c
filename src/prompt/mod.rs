use crate::prefs::GardenPreferences;

/// Headings the synthesis model is required to emit, shared with validation
/// and tests so the template and the checks cannot drift apart.
pub const SECTION_MARKERS: [&str; 6] = [
    "## 🌿 Personalized Garden Design Report",
    "### 🖼️ Visual Landscape Insights",
    "### 🌞 Environmental & Layout Context",
    "### 🎯 Garden Usage Strategy",
    "### 🌱 Planting Recommendations",
    "### 🔗 Curated Inspiration Resources",
];

/// Role and instruction text for the vision call. Visual interpretation
/// only; plant suggestions are deferred to the synthesis stage.
pub fn analysis_instructions() -> String {
    r#"You are a landscape analysis assistant. Review the uploaded garden photo to identify:
- General landscape type (e.g., tropical, shaded, arid, mixed)
- Sunlight exposure level and shadows
- Soil visibility, slope, and planting density
- Space division (open lawn, patio, beds, etc.)

Instructions:
- Inspect the garden image carefully.
- Identify the dominant landscape type and notable features (e.g., shaded corners, dry patches).
- Mention any visible planting opportunities or constraints (e.g., slope, crowded areas, paved zones).
- Avoid giving specific plant suggestions here — focus purely on visual interpretation.

Analyze this garden photo to assess the landscape and layout features."#
        .to_string()
}

/// Composite research prompt: all four preference selections plus the visual
/// insights text, verbatim. The downstream model is asked for 5–7 titled
/// markdown links.
pub fn research_prompt(prefs: &GardenPreferences, visual_insights: &str) -> String {
    format!(
        r#"Lighting Conditions: {lighting}
Climate Zone: {climate}
Garden Use: {garden_use}
Watering Preference: {watering}

Visual Landscape Insights:
{visual_insights}

Based on these inputs and the web search results provided, return 5-7 relevant
gardening links (plant lists, layout ideas, blog posts, etc.) in Markdown
format with clear titles. Prefer high-quality garden layout and planting
inspiration resources suited to this environment."#,
        lighting = prefs.lighting,
        climate = prefs.climate,
        garden_use = prefs.garden_use,
        watering = prefs.watering,
        visual_insights = visual_insights,
    )
}

/// Focused search-engine query derived from the four selections, e.g.
/// "low-maintenance drought-tolerant plants for full sun arid backyard".
pub fn search_query(prefs: &GardenPreferences) -> String {
    format!(
        "{watering} plants and garden layout ideas for {lighting} {climate} backyard, {garden_use}",
        watering = prefs.watering,
        lighting = prefs.lighting,
        climate = prefs.climate,
        garden_use = prefs.garden_use,
    )
    .to_lowercase()
}

fn report_skeleton() -> String {
    let [title, visual, environment, usage, planting, resources] = SECTION_MARKERS;
    format!(
        r#"Start the report with: {title}

{visual}
- Describe the visual elements identified from the uploaded photo: surface condition, planting density, structures, lighting.
- Mention soil, slope, layout zones, or shaded/open areas.
- Embed hyperlinks to relevant garden layout styles if helpful (e.g., [sun-loving raised beds](https://...), [dry-climate lawn alternatives](https://...)).

{environment}
- Explain how the climate zone, lighting, and watering preferences affect layout design.
- Recommend layout types or hardscaping approaches (e.g., xeriscaping, drip irrigation).
- Embed helpful design inspiration links (e.g., [xeriscaping tips](https://...), [shaded patio layout](https://...)).

{usage}
- Provide layout ideas aligned with the intended use (e.g., seating corners, edible beds, play zones).
- Mention functional flow: where seating could go, where herbs need sun, etc.
- Embed examples or layout plans (e.g., [backyard seating nooks](https://...), [modular herb bed layout](https://...)).

{planting}
- Suggest general plant types suitable for the environment (e.g., succulents, native flowers, herbs).
- Provide planting layout styles or plant combinations (e.g., layered borders, wildlife-attracting zones).
- Embed plant guides or curated plant list links (e.g., [drought-tolerant plants list](https://...), [low-maintenance edible garden](https://...)).

{resources}
- List the web-sourced links clearly with meaningful titles (e.g., [Backyard Layouts for Full Sun](https://...)).
- Group them by theme if relevant (e.g., design, planting, sustainability).

**Important:** Embed helpful, relevant hyperlinks throughout the report, not just in the final section. Aim for at least 1-2 embedded links per section.

Write in a confident, positive, and user-friendly tone.
Use markdown headings, bullet points, and short paragraphs.
Return only the markdown-formatted report, no explanation or metadata."#,
    )
}

/// Final prompt: both upstream text blobs plus the fixed six-section
/// skeleton the synthesis model must fill in.
pub fn synthesis_prompt(visual_insights: &str, research_links: &str) -> String {
    format!(
        r#"You are a garden planning assistant. You are given:
1. A visual analysis of a user's garden space.
2. Curated links to plant suggestions and layout ideas.

Visual Analysis:
{visual_insights}

Web-Based Inspiration Links:
{research_links}

Generate a markdown-formatted garden recommendation report following this structure:

{skeleton}"#,
        visual_insights = visual_insights,
        research_links = research_links,
        skeleton = report_skeleton(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::{Climate, GardenPreferences, GardenUse, Lighting, Watering};

    fn arid_prefs() -> GardenPreferences {
        GardenPreferences {
            image: None,
            lighting: Lighting::FullSun,
            climate: Climate::Arid,
            garden_use: GardenUse::FoodGrowing,
            watering: Watering::Low,
        }
    }

    #[test]
    fn research_prompt_embeds_every_preference_and_the_insights() {
        let prompt = research_prompt(&arid_prefs(), "open sunny yard, sandy soil");
        assert!(prompt.contains("Full sun"));
        assert!(prompt.contains("Arid/Desert"));
        assert!(prompt.contains("Food growing (herbs/vegetables)"));
        assert!(prompt.contains("Low (drought-tolerant)"));
        assert!(prompt.contains("open sunny yard, sandy soil"));
    }

    #[test]
    fn synthesis_prompt_carries_both_blobs_and_all_sections() {
        let prompt = synthesis_prompt("INSIGHTS-BLOB", "LINKS-BLOB");
        assert!(prompt.contains("INSIGHTS-BLOB"));
        assert!(prompt.contains("LINKS-BLOB"));
        for marker in SECTION_MARKERS {
            assert!(prompt.contains(marker), "missing {marker}");
        }
    }

    #[test]
    fn analysis_instructions_forbid_plant_suggestions() {
        let text = analysis_instructions();
        assert!(text.contains("Avoid giving specific plant suggestions"));
    }

    #[test]
    fn search_query_is_lowercased_and_preference_driven() {
        let q = search_query(&arid_prefs());
        assert!(q.contains("full sun"));
        assert!(q.contains("arid/desert"));
        assert!(q.contains("drought-tolerant"));
        assert_eq!(q, q.to_lowercase());
    }
}
