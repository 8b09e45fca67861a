//! # 提示词构建
//!
//! ## 设计思路
//!
//! 面板上的七个风格选项收敛为 `StylePreferences`，所有模板共用同一份风格说明渲染逻辑。
//! 选项值为空或为 `"None"` 时视为未选择，不会出现在提示词里。
//!
//! ## 实现思路
//!
//! - `from_selections`：从面板原始取值构建（过滤 `"None"`，备注去首尾空白）
//! - `style_instructions`：按固定顺序渲染 `Key: value` 行
//! - `*_prompt`：各类资源的模板
//! - `preview_*`：描述为空时返回引导文案，否则返回完整提示词

use serde::{Deserialize, Serialize};

/// 风格偏好。
///
/// 同时作为预设存储的数据载荷。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_palette: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_notes: Option<String>,
}

/// 面板上的原始选项值。
///
/// 背景与道具面板没有角色风格选项，传 `None` 即可。
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleSelections<'a> {
    pub art_style: &'a str,
    pub mood: &'a str,
    pub color_palette: &'a str,
    pub character_style: Option<&'a str>,
    pub line_style: &'a str,
    pub composition: &'a str,
    pub additional_notes: &'a str,
}

fn selected(value: &str) -> Option<String> {
    if value.is_empty() || value == "None" {
        None
    } else {
        Some(value.to_string())
    }
}

impl StylePreferences {
    pub fn from_selections(selections: StyleSelections<'_>) -> Self {
        let notes = selections.additional_notes.trim();
        Self {
            art_style: selected(selections.art_style),
            mood: selected(selections.mood),
            color_palette: selected(selections.color_palette),
            character_style: selections.character_style.and_then(selected),
            line_style: selected(selections.line_style),
            composition: selected(selections.composition),
            additional_notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Art Style", &self.art_style),
            ("Mood", &self.mood),
            ("Color Palette", &self.color_palette),
            ("Character Style", &self.character_style),
            ("Line Style", &self.line_style),
            ("Composition", &self.composition),
            ("Additional Notes", &self.additional_notes),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
    }

    /// 渲染风格说明，每行一项。
    pub fn style_instructions(&self) -> String {
        self.entries()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 背景朝向。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
}

impl Orientation {
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("landscape") {
            Self::Landscape
        } else {
            Self::Portrait
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Landscape => "landscape",
            Self::Portrait => "portrait",
        }
    }

    pub fn aspect_ratio(self) -> &'static str {
        match self {
            Self::Landscape => "16:9",
            Self::Portrait => "9:16",
        }
    }
}

fn with_style(mut prompt: String, style: Option<&StylePreferences>) -> String {
    if let Some(style) = style {
        prompt.push_str("\n\nStyle Requirements:\n");
        prompt.push_str(&style.style_instructions());
    }
    prompt
}

pub fn character_prompt(description: &str, style: Option<&StylePreferences>) -> String {
    let prompt = format!(
        "Create a character image based on the following description:\n\
         {description}\n\
         \n\
         The character should be:\n\
         - Entire character's body shows in the image\n\
         - Clear and recognizable at small sizes\n\
         - Well-defined silhouette\n\
         - no background\n\
         - no other objects\n\
         - Consistent art style\n\
         - Follow the reference image if provided\n\
         - No shadows\n"
    );
    with_style(prompt, style)
}

pub fn sprite_prompt(description: &str, action: &str, style: Option<&StylePreferences>) -> String {
    let prompt = format!(
        "Create a 2D character sprite showing the character performing the action: {action}\n\
         \n\
         Character description: {description}\n\
         \n\
         The sprite should be:\n\
         - Clear and recognizable at small sizes\n\
         - Suitable for sprite animation\n\
         - Well-defined silhouette\n\
         - Consistent art style\n\
         - Show the character in the middle of performing the action\n\
         - Follow the reference image if provided\n"
    );
    with_style(prompt, style)
}

pub fn background_prompt(
    description: &str,
    orientation: Orientation,
    style: Option<&StylePreferences>,
) -> String {
    let prompt = format!(
        "Create a 2D game background based on the following description:\n\
         {description}\n\
         \n\
         The background should be:\n\
         - Designed for 2D games\n\
         - {} orientation ({} aspect ratio)\n\
         - Suitable for parallax scrolling\n\
         - Clear and detailed\n\
         - Consistent art style\n\
         - No characters or interactive elements\n\
         - Follow the reference image if provided\n",
        orientation.as_str(),
        orientation.aspect_ratio()
    );
    with_style(prompt, style)
}

pub fn item_prompt(description: &str, style: Option<&StylePreferences>) -> String {
    let prompt = format!(
        "Create a 2D game item sprite based on the following description:\n\
         {description}\n\
         \n\
         The item should be:\n\
         - Designed for 2D games\n\
         - Clear and recognizable at small sizes\n\
         - Suitable for inventory systems\n\
         - Well-defined silhouette\n\
         - Consistent art style\n\
         - Isolated on transparent background\n\
         - Follow the reference image if provided\n"
    );
    with_style(prompt, style)
}

/// 动画提示词。风格说明以内联形式拼在首句之后。
pub fn animation_prompt(description: &str, action: &str, style: Option<&StylePreferences>) -> String {
    let mut prompt = format!("{} performing {} action", description, action);

    if let Some(style) = style.filter(|s| !s.is_empty()) {
        prompt.push_str(". Style: ");
        prompt.push_str(&style.style_instructions());
    }

    prompt.push_str(&format!(
        "\nThe character should be performing a smooth, natural {action} movement.\n\
         The animation should be fluid and dynamic, showing the character's motion clearly.\n\
         Keep the character consistent throughout the animation.\n\
         Set against a clean background to focus on the character's movement.\n\
         The animation should be suitable for game use with clear, readable motion.\n"
    ));
    prompt
}

/// 像素风角色的下拉选项，`"None"` 或空字符串表示未选择。
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelCharacterSpec<'a> {
    pub description: &'a str,
    pub color: &'a str,
    pub mood: &'a str,
    pub weapon: &'a str,
}

fn weapon_line(weapon: &str) -> Option<&'static str> {
    match weapon {
        "Baguette" => Some("Long French bread baguette (held in hand)"),
        "Magic Wand" => Some("Magical staff/wand with glowing tip"),
        "Candy" => Some("Large lollipop/candy stick (like a colorful spiral candy on a stick)"),
        "Sword" => Some("Sword (medieval/fantasy style)"),
        _ => None,
    }
}

/// 像素风 Q 版角色提示词（正面、白底、头身比 1:1）。
pub fn pixel_character_prompt(spec: PixelCharacterSpec<'_>) -> String {
    let mut prompt = format!(
        "Create a PIXEL ART character sprite with these specifications:\n\nCharacter: {}\n",
        spec.description.trim()
    );

    if let Some(color) = selected(spec.color) {
        prompt.push_str(&format!("Primary color scheme: {}\n", color));
    }
    if let Some(mood) = selected(spec.mood) {
        prompt.push_str(&format!("Overall mood: {}\n", mood));
    }
    if let Some(weapon) = weapon_line(spec.weapon) {
        prompt.push_str(&format!("Weapon: {}\n", weapon));
    }

    prompt.push_str(
        "\nMANDATORY PIXEL ART STYLE REQUIREMENTS:\n\
         - **CONSISTENT STYLE**: Must look like it came from the same game/site as other characters\n\
         - **PIXEL ART ONLY**: Retro pixel art style, NOT smooth/realistic art\n\
         - **CHIBI PROPORTIONS**: Large head, small body - cute deformed style\n\
         - **HEAD TO BODY RATIO: 1:1** - Head size MUST equal body size (equal proportions)\n\
         - Clear pixelated edges, visible individual pixels\n\
         - Limited color palette (8-16 colors recommended)\n\
         - Clean pixel-perfect outlines\n\
         - Front-facing view\n\
         - Single character, centered composition\n\
         - White background (will be made transparent)\n\
         - Game sprite aesthetic (like 8-bit, 16-bit, or 32-bit era)\n\
         - Sharp, blocky pixel style - NOT anti-aliased or smooth\n\
         - Retro video game character design\n\
         - IMPORTANT: Face/head height = body height (1:1 ratio)\n\
         - **UNIFORM STYLE**: Same art style, proportions, and rendering as reference characters\n",
    );
    prompt
}

const CHARACTER_HINT: &str = "Enter a character description to see the generated prompt...";

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

pub fn preview_character_prompt(description: &str, selections: StyleSelections<'_>) -> String {
    if is_blank(description) {
        return CHARACTER_HINT.to_string();
    }
    character_prompt(description, Some(&StylePreferences::from_selections(selections)))
}

pub fn preview_animation_prompt(
    description: &str,
    action: &str,
    selections: StyleSelections<'_>,
) -> String {
    if is_blank(description) {
        return CHARACTER_HINT.to_string();
    }
    if is_blank(action) {
        return "Enter an animation action to see the generated prompt...".to_string();
    }
    animation_prompt(
        description,
        action.trim(),
        Some(&StylePreferences::from_selections(selections)),
    )
}

pub fn preview_background_prompt(
    description: &str,
    orientation: Orientation,
    selections: StyleSelections<'_>,
) -> String {
    if is_blank(description) {
        return "Enter a background description to see the generated prompt...".to_string();
    }
    let selections = StyleSelections { character_style: None, ..selections };
    background_prompt(
        description,
        orientation,
        Some(&StylePreferences::from_selections(selections)),
    )
}

/// 逗号分隔的动作列表只预览第一个动作。
pub fn preview_sprite_prompt(
    description: &str,
    actions_text: &str,
    selections: StyleSelections<'_>,
) -> String {
    if is_blank(description) {
        return CHARACTER_HINT.to_string();
    }
    if is_blank(actions_text) {
        return "Enter actions to see the generated prompt...".to_string();
    }

    match actions_text.split(',').map(str::trim).find(|a| !a.is_empty()) {
        Some(action) => sprite_prompt(
            description,
            action,
            Some(&StylePreferences::from_selections(selections)),
        ),
        None => "Enter valid actions separated by commas...".to_string(),
    }
}

pub fn preview_item_prompt(description: &str, selections: StyleSelections<'_>) -> String {
    if is_blank(description) {
        return "Enter an item description to see the generated prompt...".to_string();
    }
    let selections = StyleSelections { character_style: None, ..selections };
    item_prompt(description, Some(&StylePreferences::from_selections(selections)))
}
