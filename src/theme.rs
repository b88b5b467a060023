use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub node_fill: String,
    pub node_stroke: String,
    pub node_stroke_width: f32,
    pub line_color: String,
    pub line_width: f32,
    pub line_dasharray: String,
    pub background: Option<String>,
}

impl Theme {
    /// Black on white, dashed edges.
    pub fn classic() -> Self {
        Self {
            font_family: "Helvetica, sans-serif".to_string(),
            font_size: 10.0,
            text_color: "#000000".to_string(),
            node_fill: "white".to_string(),
            node_stroke: "black".to_string(),
            node_stroke_width: 2.0,
            line_color: "black".to_string(),
            line_width: 1.0,
            line_dasharray: "5, 2".to_string(),
            background: None,
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 11.0,
            text_color: "#1C2430".to_string(),
            node_fill: "#F8FAFF".to_string(),
            node_stroke: "#C7D2E5".to_string(),
            node_stroke_width: 1.4,
            line_color: "#7A8AA6".to_string(),
            line_width: 1.2,
            line_dasharray: String::new(),
            background: Some("#FFFFFF".to_string()),
        }
    }

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "classic" | "default" => Some(Self::classic()),
            "modern" => Some(Self::modern()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
