use super::auto_colors::AutoColorTable;

pub(crate) const HOST_FONT_FACE: &str = "rmmz-mainfont";
pub(crate) const HOST_FONT_SIZE: u32 = 26;
pub(crate) const HOST_TEXT_COLOR: &str = "#ffffff";

/// Font settings of a window's contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FontState {
    pub(crate) face: String,
    pub(crate) size: u32,
    pub(crate) color: String,
}

impl Default for FontState {
    fn default() -> Self {
        Self {
            face: HOST_FONT_FACE.to_string(),
            size: HOST_FONT_SIZE,
            color: HOST_TEXT_COLOR.to_string(),
        }
    }
}

/// Text pipeline shared by every window: font reset plus escape conversion.
#[derive(Debug, Clone)]
pub(crate) struct WindowText {
    font_face: String,
    auto_colors: AutoColorTable,
}

impl WindowText {
    pub(crate) fn new(font_face: impl Into<String>, auto_colors: AutoColorTable) -> Self {
        Self {
            font_face: font_face.into(),
            auto_colors,
        }
    }

    /// Host defaults, then the configured face.
    pub(crate) fn reset_font_settings(&self) -> FontState {
        FontState {
            face: self.font_face.clone(),
            ..FontState::default()
        }
    }

    pub(crate) fn auto_colors(&self) -> &AutoColorTable {
        &self.auto_colors
    }

    /// Turns `\` escapes into control escapes (`\\` stays a literal
    /// backslash), then applies the auto-color filter.
    pub(crate) fn convert_escape_characters(&self, text: &str) -> String {
        let converted = text.replace('\\', "\x1b").replace("\x1b\x1b", "\\");
        self.auto_colors.apply(&converted)
    }
}

/// Printable form of converted text, with control escapes shown as `\`.
pub(crate) fn printable(text: &str) -> String {
    text.replace('\x1b', "\\")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn window_text(words: &[&str]) -> WindowText {
        let mut lists = BTreeMap::new();
        lists.insert(
            "C3".to_string(),
            words.iter().map(|word| word.to_string()).collect(),
        );
        WindowText::new(
            "Coneria Pixel",
            AutoColorTable::from_params(&lists).expect("colors"),
        )
    }

    #[test]
    fn reset_applies_custom_face_over_host_defaults() {
        let font = window_text(&[]).reset_font_settings();
        assert_eq!(font.face, "Coneria Pixel");
        assert_eq!(font.size, HOST_FONT_SIZE);
        assert_eq!(font.color, HOST_TEXT_COLOR);
    }

    #[test]
    fn escapes_convert_before_coloring() {
        let text = window_text(&["ship"]);
        let converted = text.convert_escape_characters(r"\C[2]Ship\C[0] at C:\\docks");
        assert_eq!(converted, "\x1bC[2]\x1bC[3]Ship\x1bC[0]\x1bC[0] at C:\\docks");
        assert_eq!(
            printable(&converted),
            r"\C[2]\C[3]Ship\C[0]\C[0] at C:\docks"
        );
    }
}
