//! The LaF tab of the game's settings panel
//!
//! Content wraps the game's own panel and asks the host for the HTML of the
//! LaF tab every time the panel renders. This module owns the descriptor
//! table, the search filter, the HTML, and what happens when a value or one
//! of the tool links is changed.

use crate::i18n::Labels;
use laf_core::config::{ConfigKey, ConfigStore, Lang};
use laf_core::{LafError, LafResult};
use serde::Deserialize;
use serde_json::Value;

/// Name of the tab appended to the game's panel
pub const TAB_NAME: &str = "LaF";

const RESTART_MARKER: &str = "<span style='color: #eb5656'> *</span>";

/// Text of a select option
#[derive(Clone, Copy)]
pub enum OptionText {
    Fixed(&'static str),
    Label(fn(&Labels) -> &'static str),
}

impl OptionText {
    fn resolve(self, labels: &Labels) -> &'static str {
        match self {
            OptionText::Fixed(text) => text,
            OptionText::Label(get) => get(labels),
        }
    }
}

#[derive(Clone, Copy)]
pub enum SettingInput {
    Toggle,
    Select(&'static [(&'static str, OptionText)]),
}

/// One row of the LaF tab
#[derive(Clone, Copy)]
pub struct SettingDescriptor {
    pub key: ConfigKey,
    pub category: &'static str,
    pub label: fn(&Labels) -> &'static str,
    pub input: SettingInput,
    pub requires_restart: bool,
}

impl SettingDescriptor {
    pub fn id(&self) -> &'static str {
        self.key.as_str()
    }

    /// Case-insensitive substring match against id, label and category
    pub fn matches(&self, query: &str, labels: &Labels) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        [self.id(), (self.label)(labels), self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
    }

    fn render(&self, store: &ConfigStore, labels: &Labels) -> String {
        let id = self.id();
        let mut html = format!(
            "<div class='settName' id='{}_div' style='display:block'>{} ",
            id,
            escape_html((self.label)(labels))
        );
        if self.requires_restart {
            html.push_str(RESTART_MARKER);
        }

        match self.input {
            SettingInput::Toggle => {
                let checked = if store.get_bool(self.key) { " checked" } else { "" };
                html.push_str(&format!(
                    "<label class='switch'><input type='checkbox' onclick='window.laf.setConfig(\"{}\", this.checked)'{}><span class='slider'></span></label>",
                    id, checked
                ));
            }
            SettingInput::Select(options) => {
                let current = store.get_string(self.key);
                html.push_str(&format!(
                    "<select onchange=\"window.laf.setConfig('{}', this.value)\" class=\"inputGrey2\">",
                    id
                ));
                for (value, text) in options {
                    let selected = if *value == current { " selected" } else { "" };
                    html.push_str(&format!(
                        "<option value=\"{}\"{}>{}</option>",
                        escape_html(value),
                        selected,
                        escape_html(text.resolve(labels))
                    ));
                }
                html.push_str("</select>");
            }
        }

        html.push_str("</div>");
        html
    }

    fn validate(&self, value: &Value) -> LafResult<()> {
        match (self.input, value) {
            (SettingInput::Toggle, Value::Bool(_)) => Ok(()),
            (SettingInput::Select(options), Value::String(s))
                if options.iter().any(|(option, _)| option == s) =>
            {
                Ok(())
            }
            _ => Err(LafError::config(format!(
                "Invalid value {} for setting {}",
                value,
                self.id()
            ))),
        }
    }
}

static LANG_OPTIONS: &[(&str, OptionText)] = &[
    ("en_US", OptionText::Fixed("English")),
    ("ja_JP", OptionText::Fixed("日本語")),
];

static ANGLE_OPTIONS: &[(&str, OptionText)] = &[
    ("default", OptionText::Fixed("Default")),
    ("gl", OptionText::Fixed("OpenGL")),
    ("d3d11", OptionText::Fixed("D3D11")),
    ("d3d9", OptionText::Fixed("D3D9")),
    ("d3d11on12", OptionText::Fixed("D3D11on12")),
];

static EXIT_OPTIONS: &[(&str, OptionText)] = &[
    ("top", OptionText::Label(|l| l.exit_top)),
    ("bottom", OptionText::Label(|l| l.exit_bottom)),
    ("disable", OptionText::Label(|l| l.exit_disable)),
];

pub static DESCRIPTORS: &[SettingDescriptor] = &[
    SettingDescriptor {
        key: ConfigKey::Lang,
        category: "lang",
        label: |l| l.language_setting,
        input: SettingInput::Select(LANG_OPTIONS),
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::UnlimitedFps,
        category: "fps",
        label: |l| l.unlimited_fps,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::AngleType,
        category: "render",
        label: |l| l.angle_type,
        input: SettingInput::Select(ANGLE_OPTIONS),
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::Webgl2Context,
        category: "render",
        label: |l| l.webgl2_context,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::AcceleratedCanvas,
        category: "render",
        label: |l| l.accelerated_canvas,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::InProcessGpu,
        category: "render",
        label: |l| l.in_process_gpu,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::EnableTimer,
        category: "interface",
        label: |l| l.enable_timer,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::ShowExitBtn,
        category: "interface",
        label: |l| l.show_exit_btn,
        input: SettingInput::Select(EXIT_OPTIONS),
        requires_restart: true,
    },
    SettingDescriptor {
        key: ConfigKey::EnableRpc,
        category: "discord",
        label: |l| l.enable_rpc,
        input: SettingInput::Toggle,
        requires_restart: true,
    },
];

/// State of the game's panel at render time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelView {
    /// Index of the tab the panel is showing
    pub active_tab: usize,
    /// Index of the LaF tab
    pub own_tab: usize,
    /// The panel's search box, if anything is typed in it
    pub query: Option<String>,
}

impl PanelView {
    fn search(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty())
    }

    /// Our rows show on our own tab, or on any tab while a search is active
    pub fn is_visible(&self) -> bool {
        self.active_tab == self.own_tab || self.search().is_some()
    }
}

/// The tool links under the rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolAction {
    ClearCache,
    ResetOptions,
    RestartClient,
}

impl ToolAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolAction::ClearCache => "clearCache",
            ToolAction::ResetOptions => "resetOptions",
            ToolAction::RestartClient => "restartClient",
        }
    }
}

/// Native capabilities the engine needs
pub trait SettingsHost {
    fn confirm(&mut self, message: &str) -> bool;
    fn alert(&mut self, message: &str);
    fn clear_cache(&mut self) -> LafResult<()>;
    fn relaunch(&mut self);
}

pub struct SettingsEngine {
    descriptors: &'static [SettingDescriptor],
    labels: &'static Labels,
}

impl SettingsEngine {
    /// Engine over the full table, labelled in `lang`
    pub fn new(lang: Lang) -> Self {
        Self::with_descriptors(DESCRIPTORS, lang)
    }

    pub fn with_descriptors(descriptors: &'static [SettingDescriptor], lang: Lang) -> Self {
        Self {
            descriptors,
            labels: Labels::for_lang(lang),
        }
    }

    pub fn labels(&self) -> &'static Labels {
        self.labels
    }

    pub fn descriptor(&self, id: &str) -> Option<&'static SettingDescriptor> {
        self.descriptors.iter().find(|d| d.id() == id)
    }

    /// Descriptors that survive the search query, in table order
    pub fn filter(&self, query: Option<&str>) -> Vec<&'static SettingDescriptor> {
        self.descriptors
            .iter()
            .filter(|d| query.map_or(true, |q| d.matches(q, self.labels)))
            .collect()
    }

    /// HTML for the LaF tab, or an empty string when it should not show
    pub fn render(&self, store: &ConfigStore, view: &PanelView) -> String {
        if !view.is_visible() {
            return String::new();
        }

        let mut html: String = self
            .filter(view.search())
            .into_iter()
            .map(|d| d.render(store, self.labels))
            .collect();

        html.push_str(&format!(
            "<a onclick=\"window.laf.toolAction('{}')\" class=\"menuLink\">{}</a> | \
             <a onclick=\"window.laf.toolAction('{}')\" class=\"menuLink\">{}</a> | \
             <a onclick=\"window.laf.toolAction('{}')\" class=\"menuLink\">{}</a>",
            ToolAction::ClearCache.as_str(),
            escape_html(self.labels.clear_cache),
            ToolAction::ResetOptions.as_str(),
            escape_html(self.labels.reset_option),
            ToolAction::RestartClient.as_str(),
            escape_html(self.labels.restart),
        ));
        html.push_str("</div>");
        html
    }

    /// Write a value from the panel through to the store.
    ///
    /// Returns whether a relaunch was requested.
    pub fn set_value(
        &self,
        store: &mut ConfigStore,
        host: &mut dyn SettingsHost,
        id: &str,
        value: Value,
    ) -> LafResult<bool> {
        let descriptor = self
            .descriptor(id)
            .ok_or_else(|| LafError::config(format!("Unknown setting: {}", id)))?;
        descriptor.validate(&value)?;

        log::info!("{} has been set to {}", id, value);
        store.set(id, value)?;

        if descriptor.requires_restart && host.confirm(self.labels.restart_msg) {
            host.relaunch();
            return Ok(true);
        }
        Ok(false)
    }

    /// Run one of the tool links. Returns whether a relaunch was requested.
    pub fn run_action(
        &self,
        store: &mut ConfigStore,
        host: &mut dyn SettingsHost,
        action: ToolAction,
    ) -> LafResult<bool> {
        match action {
            ToolAction::ClearCache => {
                if !host.confirm(self.labels.confirm_clear_cache) {
                    return Ok(false);
                }
                host.clear_cache()?;
                host.alert(self.labels.cleared_cache_and_restart);
            }
            ToolAction::ResetOptions => {
                if !host.confirm(self.labels.confirm_reset_config) {
                    return Ok(false);
                }
                store.clear()?;
                host.alert(self.labels.reseted_config_and_restart);
            }
            ToolAction::RestartClient => {}
        }
        host.relaunch();
        Ok(true)
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct FakeHost {
        accept: bool,
        confirms: Vec<String>,
        alerts: Vec<String>,
        cache_cleared: bool,
        relaunches: usize,
    }

    impl FakeHost {
        fn accepting() -> Self {
            Self {
                accept: true,
                ..Default::default()
            }
        }
    }

    impl SettingsHost for FakeHost {
        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.accept
        }

        fn alert(&mut self, message: &str) {
            self.alerts.push(message.to_string());
        }

        fn clear_cache(&mut self) -> LafResult<()> {
            self.cache_cleared = true;
            Ok(())
        }

        fn relaunch(&mut self) {
            self.relaunches += 1;
        }
    }

    fn own_tab() -> PanelView {
        PanelView {
            active_tab: 6,
            own_tab: 6,
            query: None,
        }
    }

    #[test]
    fn test_every_descriptor_is_a_config_key() {
        for d in DESCRIPTORS {
            assert_eq!(ConfigKey::from_id(d.id()), Some(d.key));
        }
    }

    #[test]
    fn test_write_through_then_read() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        let mut host = FakeHost::default();

        let relaunched = engine
            .set_value(&mut store, &mut host, "unlimitedFPS", json!(false))
            .unwrap();

        assert_eq!(store.get("unlimitedFPS", json!(true)), json!(false));
        assert!(!relaunched);
        assert_eq!(host.confirms.len(), 1);
        assert_eq!(host.relaunches, 0);
    }

    #[test]
    fn test_accepted_restart_relaunches() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        let mut host = FakeHost::accepting();

        assert!(engine
            .set_value(&mut store, &mut host, "angleType", json!("d3d11"))
            .unwrap());
        assert_eq!(host.relaunches, 1);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        let mut host = FakeHost::accepting();

        assert!(engine
            .set_value(&mut store, &mut host, "angleType", json!("vulkan"))
            .is_err());
        assert!(engine
            .set_value(&mut store, &mut host, "enableTimer", json!("yes"))
            .is_err());
        assert!(engine
            .set_value(&mut store, &mut host, "nope", json!(true))
            .is_err());
        assert!(!store.contains("angleType"));
        assert!(host.confirms.is_empty());
    }

    #[test]
    fn test_search_matches_id_label_and_category() {
        let engine = SettingsEngine::new(Lang::EnUs);

        let ids = |q: &str| -> Vec<&'static str> {
            engine.filter(Some(q)).iter().map(|d| d.id()).collect()
        };

        assert_eq!(ids("lang"), vec!["lang"]);
        assert_eq!(ids("LANG"), vec!["lang"]);
        assert_eq!(ids("discord"), vec!["enableRPC"]);
        assert_eq!(ids("Exit Button"), vec!["showExitBtn"]);
        assert_eq!(ids("render").len(), 4);
        assert!(ids("zzz").is_empty());
    }

    #[test]
    fn test_hidden_on_other_tabs_without_search() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let store = ConfigStore::in_memory();
        let view = PanelView {
            active_tab: 2,
            own_tab: 6,
            query: Some("  ".into()),
        };
        assert_eq!(engine.render(&store, &view), "");
    }

    #[test]
    fn test_search_surfaces_rows_on_other_tabs() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let store = ConfigStore::in_memory();
        let view = PanelView {
            active_tab: 2,
            own_tab: 6,
            query: Some("lang".into()),
        };
        let html = engine.render(&store, &view);
        assert!(html.contains("id='lang_div'"));
        assert!(!html.contains("id='angleType_div'"));
    }

    #[test]
    fn test_render_own_tab() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        store.set("inProcessGPU", json!(true)).unwrap();

        let html = engine.render(&store, &own_tab());

        for d in DESCRIPTORS {
            assert!(html.contains(&format!("id='{}_div'", d.id())));
        }
        assert_eq!(html.matches(RESTART_MARKER).count(), DESCRIPTORS.len());
        assert!(html.contains("<option value=\"gl\" selected>OpenGL</option>"));
        assert!(html.contains("<option value=\"ja_JP\" selected>"));
        assert!(html.contains("setConfig(\"inProcessGPU\", this.checked)' checked>"));
        assert!(html.contains("toolAction('clearCache')"));
        assert!(html.contains("toolAction('resetOptions')"));
        assert!(html.contains("toolAction('restartClient')"));
        assert!(html.ends_with("</a></div>"));
    }

    #[test]
    fn test_declined_actions_change_nothing() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        store.set("lang", json!("en_US")).unwrap();
        let mut host = FakeHost::default();

        assert!(!engine
            .run_action(&mut store, &mut host, ToolAction::ClearCache)
            .unwrap());
        assert!(!engine
            .run_action(&mut store, &mut host, ToolAction::ResetOptions)
            .unwrap());

        assert!(!host.cache_cleared);
        assert!(host.alerts.is_empty());
        assert_eq!(host.relaunches, 0);
        assert!(store.contains("lang"));
    }

    #[test]
    fn test_accepted_actions_act_alert_and_relaunch() {
        let engine = SettingsEngine::new(Lang::EnUs);
        let mut store = ConfigStore::in_memory();
        store.set("lang", json!("en_US")).unwrap();
        let mut host = FakeHost::accepting();

        engine
            .run_action(&mut store, &mut host, ToolAction::ClearCache)
            .unwrap();
        engine
            .run_action(&mut store, &mut host, ToolAction::ResetOptions)
            .unwrap();

        assert!(host.cache_cleared);
        assert!(!store.contains("lang"));
        assert_eq!(
            host.alerts,
            vec![
                engine.labels().cleared_cache_and_restart.to_string(),
                engine.labels().reseted_config_and_restart.to_string()
            ]
        );
        assert_eq!(host.relaunches, 2);
    }

    #[test]
    fn test_restart_needs_no_confirmation() {
        let engine = SettingsEngine::new(Lang::JaJp);
        let mut store = ConfigStore::in_memory();
        let mut host = FakeHost::default();

        assert!(engine
            .run_action(&mut store, &mut host, ToolAction::RestartClient)
            .unwrap());
        assert!(host.confirms.is_empty());
        assert_eq!(host.relaunches, 1);
    }

    #[test]
    fn test_tool_action_ids() {
        let action: ToolAction = serde_json::from_value(json!("resetOptions")).unwrap();
        assert_eq!(action, ToolAction::ResetOptions);
        assert_eq!(action.as_str(), "resetOptions");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href='x'>&\"</a>"), "&lt;a href=&#39;x&#39;&gt;&amp;&quot;&lt;/a&gt;");
    }
}
