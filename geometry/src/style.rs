/// Visual style applied to a rendered or pending layer. The color and icon
/// can be overridden per record by decorative meta fields.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    color: String,
    fill_color: String,
    opacity: f64,
    icon: Option<String>,
}

impl LayerStyle {
    pub fn new(color: &str, fill_color: &str, opacity: &f64) -> Self {
        Self {
            color: color.to_owned(),
            fill_color: fill_color.to_owned(),
            opacity: *opacity,
            icon: None,
        }
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn fill_color(&self) -> &str {
        &self.fill_color
    }

    pub fn opacity(&self) -> &f64 {
        &self.opacity
    }

    pub fn icon(&self) -> &Option<String> {
        &self.icon
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = color.to_owned();
        self.fill_color = color.to_owned();
    }

    pub fn set_icon(&mut self, icon: &str) {
        self.icon = Some(icon.to_owned());
    }
}
