//! Text box shape.

use super::{CssColor, ObjectId, ObjectProps, ShapeTrait};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Font family options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    TimesNewRoman,
    CourierNew,
    Georgia,
    Verdana,
}

impl FontFamily {
    /// CSS family name.
    pub fn name(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::CourierNew => "Courier New",
            FontFamily::Georgia => "Georgia",
            FontFamily::Verdana => "Verdana",
        }
    }

    /// Get all available font families.
    pub fn all() -> &'static [FontFamily] {
        &[
            FontFamily::Arial,
            FontFamily::Helvetica,
            FontFamily::TimesNewRoman,
            FontFamily::CourierNew,
            FontFamily::Georgia,
            FontFamily::Verdana,
        ]
    }

    /// Look up a family by its CSS name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
    Lighter,
    Bolder,
}

impl FontWeight {
    pub fn name(&self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
            FontWeight::Lighter => "lighter",
            FontWeight::Bolder => "bolder",
        }
    }

    pub fn all() -> &'static [FontWeight] {
        &[
            FontWeight::Normal,
            FontWeight::Bold,
            FontWeight::Lighter,
            FontWeight::Bolder,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|w| w.name().eq_ignore_ascii_case(name.trim()))
    }

    /// Whether glyphs should be emboldened when rendered.
    pub fn is_heavy(&self) -> bool {
        matches!(self, FontWeight::Bold | FontWeight::Bolder)
    }
}

/// A wrapping text box of fixed width.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Textbox {
    pub(crate) id: ObjectId,
    pub text: String,
    /// Box width; text wraps inside it.
    pub width: f64,
    pub font_family: FontFamily,
    pub font_weight: FontWeight,
    pub font_size: u32,
    pub props: ObjectProps,
}

impl Textbox {
    /// Default box width for new text.
    pub const DEFAULT_WIDTH: f64 = 200.0;
    /// Line height as a multiple of the font size.
    pub const LINE_HEIGHT: f64 = 1.16;

    pub fn new(text: impl Into<String>, left: f64, top: f64, fill: impl Into<CssColor>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            width: Self::DEFAULT_WIDTH,
            font_family: FontFamily::default(),
            font_weight: FontWeight::default(),
            font_size: 24,
            props: ObjectProps::at(left, top, fill),
        }
    }

    pub fn with_font_family(mut self, family: FontFamily) -> Self {
        self.font_family = family;
        self
    }

    pub fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = weight;
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    pub fn line_count(&self) -> usize {
        let count = self.text.lines().count().max(1);
        if self.text.ends_with('\n') {
            count + 1
        } else {
            count
        }
    }
}

impl ShapeTrait for Textbox {
    fn id(&self) -> ObjectId {
        self.id
    }

    fn props(&self) -> &ObjectProps {
        &self.props
    }

    fn props_mut(&mut self) -> &mut ObjectProps {
        &mut self.props
    }

    fn base_size(&self) -> Size {
        let height = self.line_count() as f64 * f64::from(self.font_size) * Self::LINE_HEIGHT;
        Size::new(self.width, height)
    }
}
