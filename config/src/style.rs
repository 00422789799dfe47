use serde::Deserialize;

#[derive(Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    default: LayerStyleConfig,
    highlight: LayerStyleConfig,
}

impl StyleConfig {
    pub fn default_style(&self) -> &LayerStyleConfig {
        &self.default
    }

    pub fn highlight(&self) -> &LayerStyleConfig {
        &self.highlight
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            default: LayerStyleConfig {
                color: "green".to_owned(),
                fill_color: "green".to_owned(),
                opacity: 0.5,
            },
            highlight: LayerStyleConfig {
                color: "yellow".to_owned(),
                fill_color: "yellow".to_owned(),
                opacity: 1.0,
            },
        }
    }
}

#[derive(Deserialize)]
pub struct LayerStyleConfig {
    color: String,
    fill_color: String,
    opacity: f64,
}

impl LayerStyleConfig {
    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn fill_color(&self) -> &str {
        &self.fill_color
    }

    pub fn opacity(&self) -> &f64 {
        &self.opacity
    }
}
