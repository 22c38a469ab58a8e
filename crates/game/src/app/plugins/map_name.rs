use super::custom_font::{FontState, WindowText};

pub(crate) const LINE_HEIGHT: u32 = 36;
pub(crate) const WINDOW_PADDING: u32 = 12;

const WINDOW_X: i32 = 20;
const WINDOW_Y: i32 = 0;
const WINDOW_WIDTH_MARGIN: u32 = 100;
const WINDOW_LINES: u32 = 2;
const WINDOW_OPACITY: u8 = 0;
const DISPLAY_SECONDS: u32 = 5;
const FRAMES_PER_SECOND: u32 = 60;
pub(crate) const DISPLAY_FRAMES: u32 = DISPLAY_SECONDS * FRAMES_PER_SECOND;
const BORDER_PX: u32 = 4;
const NAME_FONT_SIZE: u32 = 24;
const BACKGROUND_COLOR: &str = "rgba(0,0,128,0.7)";
const BORDER_COLOR: &str = "#FFFFFF";
const NAME_COLOR: &str = "#FFFFFF";

pub(crate) fn fitting_height(lines: u32) -> u32 {
    lines * LINE_HEIGHT + WINDOW_PADDING * 2
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextAlign {
    Center,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DrawCommand {
    FillRect {
        rect: Rect,
        color: &'static str,
    },
    Text {
        text: String,
        x: i32,
        y: i32,
        max_width: u32,
        align: TextAlign,
        font: FontState,
    },
}

/// Banner that shows the map's display name for a few seconds after the
/// player arrives on a map. Produces draw commands instead of pixels.
#[derive(Debug, Clone)]
pub(crate) struct MapNameBanner {
    rect: Rect,
    opacity: u8,
    visible: bool,
    show_count: u32,
    text: String,
    back_layer: Vec<DrawCommand>,
    contents_layer: Vec<DrawCommand>,
    window_text: WindowText,
}

impl MapNameBanner {
    pub(crate) fn new(screen_width: u32, window_text: WindowText) -> Self {
        Self {
            rect: Rect {
                x: WINDOW_X,
                y: WINDOW_Y,
                width: screen_width.saturating_sub(WINDOW_WIDTH_MARGIN),
                height: fitting_height(WINDOW_LINES),
            },
            opacity: WINDOW_OPACITY,
            visible: false,
            show_count: 0,
            text: String::new(),
            back_layer: Vec::new(),
            contents_layer: Vec::new(),
            window_text,
        }
    }

    pub(crate) fn rect(&self) -> Rect {
        self.rect
    }

    pub(crate) fn opacity(&self) -> u8 {
        self.opacity
    }

    pub(crate) fn is_visible(&self) -> bool {
        self.visible
    }

    pub(crate) fn show_count(&self) -> u32 {
        self.show_count
    }

    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Background first, then contents.
    pub(crate) fn draw_list(&self) -> impl Iterator<Item = &DrawCommand> {
        self.back_layer.iter().chain(self.contents_layer.iter())
    }

    pub(crate) fn contents_width(&self) -> u32 {
        self.rect.width.saturating_sub(WINDOW_PADDING * 2)
    }

    pub(crate) fn contents_height(&self) -> u32 {
        self.rect.height.saturating_sub(WINDOW_PADDING * 2)
    }

    pub(crate) fn refresh(&mut self, display_name: &str) {
        self.back_layer.clear();
        self.contents_layer.clear();
        self.text.clear();
        if display_name.is_empty() {
            self.visible = false;
            return;
        }
        self.visible = true;
        self.show_count = DISPLAY_FRAMES;
        self.text = display_name.to_string();

        let width = self.contents_width();
        let height = self.contents_height();
        let fill = |x: u32, y: u32, w: u32, h: u32, color| DrawCommand::FillRect {
            rect: Rect {
                x: x as i32,
                y: y as i32,
                width: w,
                height: h,
            },
            color,
        };
        self.back_layer.extend([
            fill(0, 0, width, height, BACKGROUND_COLOR),
            fill(0, 0, width, BORDER_PX, BORDER_COLOR),
            fill(0, height.saturating_sub(BORDER_PX), width, BORDER_PX, BORDER_COLOR),
            fill(0, 0, BORDER_PX, height, BORDER_COLOR),
            fill(width.saturating_sub(BORDER_PX), 0, BORDER_PX, height, BORDER_COLOR),
        ]);

        let mut font = self.window_text.reset_font_settings();
        font.size = NAME_FONT_SIZE;
        font.color = NAME_COLOR.to_string();
        let text_y = (height as i32 - LINE_HEIGHT as i32) / 2;
        self.contents_layer.push(DrawCommand::Text {
            text: self.window_text.convert_escape_characters(display_name),
            x: 0,
            y: text_y,
            max_width: width,
            align: TextAlign::Center,
            font,
        });
    }

    /// One frame: count down, then hide once the count is spent.
    pub(crate) fn update(&mut self) {
        if self.show_count > 0 {
            self.show_count -= 1;
        } else if self.visible {
            self.visible = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::app::plugins::auto_colors::AutoColorTable;

    fn banner() -> MapNameBanner {
        let colors = AutoColorTable::from_params(&BTreeMap::new()).expect("colors");
        MapNameBanner::new(816, WindowText::new("Coneria Pixel", colors))
    }

    #[test]
    fn window_rect_follows_screen_width() {
        let banner = banner();
        assert_eq!(
            banner.rect(),
            Rect {
                x: 20,
                y: 0,
                width: 716,
                height: 96
            }
        );
        assert_eq!(banner.opacity(), 0);
        assert!(!banner.is_visible());
    }

    #[test]
    fn refresh_draws_framed_centred_name() {
        let mut banner = banner();
        banner.refresh("Harbor Town");

        assert!(banner.is_visible());
        assert_eq!(banner.show_count(), 300);
        let commands: Vec<_> = banner.draw_list().cloned().collect();
        assert_eq!(commands.len(), 6);
        assert_eq!(
            commands[0],
            DrawCommand::FillRect {
                rect: Rect {
                    x: 0,
                    y: 0,
                    width: 692,
                    height: 72
                },
                color: "rgba(0,0,128,0.7)"
            }
        );
        assert_eq!(
            commands[2],
            DrawCommand::FillRect {
                rect: Rect {
                    x: 0,
                    y: 68,
                    width: 692,
                    height: 4
                },
                color: "#FFFFFF"
            }
        );
        let DrawCommand::Text { text, y, font, align, .. } = &commands[5] else {
            panic!("last command should draw the name");
        };
        assert_eq!(text, "Harbor Town");
        assert_eq!(*y, 18);
        assert_eq!(*align, TextAlign::Center);
        assert_eq!(font.size, 24);
        assert_eq!(font.face, "Coneria Pixel");
    }

    #[test]
    fn empty_name_hides_the_banner() {
        let mut banner = banner();
        banner.refresh("Harbor Town");
        banner.refresh("");
        assert!(!banner.is_visible());
        assert_eq!(banner.draw_list().count(), 0);
    }

    #[test]
    fn banner_hides_after_the_display_time() {
        let mut banner = banner();
        banner.refresh("Harbor Town");
        for _ in 0..DISPLAY_FRAMES {
            banner.update();
        }
        assert!(banner.is_visible());
        assert_eq!(banner.show_count(), 0);
        banner.update();
        assert!(!banner.is_visible());
    }
}
