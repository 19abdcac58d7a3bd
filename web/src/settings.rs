use crate::utils::*;
use serde::{Deserialize, Serialize};
use yew::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) audio_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audio_enabled: true,
        }
    }
}

impl StorageKey for Settings {
    const KEY: &'static str = "unveil:settings";
}

#[derive(Properties, PartialEq)]
pub(crate) struct SettingsProps {
    pub(crate) settings: Settings,
    pub(crate) on_change: Callback<Settings>,
}

#[function_component]
pub(crate) fn SettingsView(props: &SettingsProps) -> Html {
    let settings = props.settings;
    let on_change = props.on_change.clone();
    let onchange = Callback::from(move |_: Event| {
        let settings = Settings {
            audio_enabled: !settings.audio_enabled,
        };
        settings.local_save();
        on_change.emit(settings);
    });

    html! {
        <label class="settings">
            <input type="checkbox" role="switch" checked={settings.audio_enabled} {onchange}/>
            {"Sound"}
        </label>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(<Settings as StorageKey>::KEY, "unveil:settings");
    }
}
