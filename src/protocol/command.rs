#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    Init,
    Render,
    Dispose,
    ThemeChanged,
    PropertiesSet,
    PaneStart,
    PaneFieldChanged,
    PaneConfig,
    TermClick,
    PagesRender,
    Unknown,
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "init" => Command::Init,
            "render" => Command::Render,
            "dispose" => Command::Dispose,
            "theme.changed" => Command::ThemeChanged,
            "properties.set" => Command::PropertiesSet,
            "pane.start" => Command::PaneStart,
            "pane.field_changed" => Command::PaneFieldChanged,
            "pane.config" => Command::PaneConfig,
            "term.click" => Command::TermClick,
            "pages.render" => Command::PagesRender,
            _ => Command::Unknown,
        }
    }
}
