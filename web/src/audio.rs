use gloo::events::EventListener;
use unveil_core::Sound;
use wasm_bindgen::JsCast;
use web_sys::HtmlAudioElement;

fn load(src: &str) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(src) {
        Ok(audio) => {
            audio.load();
            Some(audio)
        }
        Err(err) => {
            log::warn!("could not load {}: {:?}", src, err);
            None
        }
    }
}

fn play(audio: &HtmlAudioElement) -> bool {
    match audio.play() {
        // rejections (e.g. autoplay policy) only show up on the promise
        Ok(_promise) => true,
        Err(err) => {
            log::warn!("could not play {}: {:?}", audio.src(), err);
            false
        }
    }
}

/// Sound cues, loaded once per page.
pub(crate) struct Sounds {
    pop: Option<HtmlAudioElement>,
    win_jingle: Option<HtmlAudioElement>,
    chime: Option<HtmlAudioElement>,
    buzzer: Option<HtmlAudioElement>,
}

impl Sounds {
    pub(crate) fn load() -> Self {
        Self {
            pop: load("assets/pop.wav"),
            win_jingle: load("assets/correct.mp3"),
            chime: load("assets/ping.wav"),
            buzzer: load("assets/buzzer.mp3"),
        }
    }

    fn element(&self, sound: Sound) -> Option<&HtmlAudioElement> {
        match sound {
            Sound::Pop => self.pop.as_ref(),
            Sound::WinJingle => self.win_jingle.as_ref(),
            Sound::Chime => self.chime.as_ref(),
        }
    }

    pub(crate) fn play(&self, sound: Sound) {
        let Some(audio) = self.element(sound) else {
            return;
        };
        if sound == Sound::Pop {
            // pops overlap on rapid clicks
            match audio
                .clone_node()
                .map(|node| node.dyn_into::<HtmlAudioElement>())
            {
                Ok(Ok(pop)) => {
                    play(&pop);
                }
                _ => log::warn!("could not clone pop sound"),
            }
        } else {
            play(audio);
        }
    }

    pub(crate) fn stop(&self, sound: Sound) {
        if let Some(audio) = self.element(sound) {
            if let Err(err) = audio.pause() {
                log::warn!("could not stop {:?}: {:?}", sound, err);
            }
            audio.set_current_time(0.0);
        }
    }

    /// Length of the buzzer clip, once its metadata has loaded.
    pub(crate) fn buzzer_secs(&self) -> Option<f64> {
        self.buzzer.as_ref().map(|buzzer| buzzer.duration())
    }

    /// Plays the wrong-guess buzzer and calls `on_end` if it plays through.
    /// A rejected play never ends, so the caller still has to time the
    /// lockout itself.
    pub(crate) fn buzz(&self, on_end: impl FnOnce() + 'static) -> Option<EventListener> {
        let buzzer = self.buzzer.as_ref()?;
        buzzer.set_current_time(0.0);
        let listener = EventListener::once(buzzer, "ended", move |_| on_end());
        play(buzzer).then_some(listener)
    }
}
