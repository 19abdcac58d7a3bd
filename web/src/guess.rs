use unveil_core::{PuzzleInfo, compose_guess};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Background of the letter boxes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum BoxTone {
    #[default]
    Plain,
    Correct,
    Wrong,
}

impl BoxTone {
    const fn class(self) -> Option<&'static str> {
        match self {
            Self::Plain => None,
            Self::Correct => Some("correct"),
            Self::Wrong => Some("wrong"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum KeyAction {
    Letter(usize, char),
    Erase(usize),
    Commit,
}

impl KeyAction {
    /// Keys pressed with Ctrl, Meta or Alt are left to the browser.
    fn from_key(key: &str, modified: bool, index: usize) -> Option<Self> {
        if modified {
            return None;
        }
        let mut chars = key.chars();
        match (key, chars.next(), chars.next()) {
            ("Enter", ..) => Some(Self::Commit),
            ("Backspace", ..) => Some(Self::Erase(index)),
            (_, Some(letter), None) if !letter.is_whitespace() => Some(Self::Letter(index, letter)),
            _ => None,
        }
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct GuessProps {
    pub(crate) info: PuzzleInfo,
    #[prop_or_default]
    pub(crate) locked: bool,
    #[prop_or_default]
    pub(crate) tone: BoxTone,
    /// Bumped by the parent to clear all boxes.
    #[prop_or_default]
    pub(crate) reset: u32,
    pub(crate) on_commit: Callback<String>,
}

/// Row of single-letter boxes the answer is typed into.
pub(crate) struct GuessInput {
    letters: Vec<Option<char>>,
    boxes: Vec<NodeRef>,
}

impl GuessInput {
    fn resize(&mut self, len: usize) {
        self.letters = vec![None; len];
        self.boxes = (0..len).map(|_| NodeRef::default()).collect();
    }

    fn focus(&self, index: usize) {
        if let Some(input) = self
            .boxes
            .get(index)
            .and_then(|node| node.cast::<HtmlInputElement>())
        {
            if let Err(err) = input.focus() {
                log::trace!("focus failed: {:?}", err);
            }
        }
    }
}

impl Component for GuessInput {
    type Message = KeyAction;
    type Properties = GuessProps;

    fn create(ctx: &Context<Self>) -> Self {
        let mut input = Self {
            letters: Vec::new(),
            boxes: Vec::new(),
        };
        input.resize(ctx.props().info.number_of_chars);
        input
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        if props.info != old_props.info || props.reset != old_props.reset {
            self.resize(props.info.number_of_chars);
        }
        true
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        if ctx.props().locked {
            return false;
        }
        match msg {
            KeyAction::Letter(index, letter) => {
                let Some(slot) = self.letters.get_mut(index) else {
                    return false;
                };
                *slot = Some(letter);
                self.focus(index + 1);
                true
            }
            KeyAction::Erase(index) => {
                let Some(slot) = self.letters.get_mut(index) else {
                    return false;
                };
                *slot = None;
                if index > 0 {
                    self.focus(index - 1);
                }
                true
            }
            KeyAction::Commit => {
                let guess = compose_guess(&self.letters);
                if guess.is_empty() {
                    return false;
                }
                log::debug!("committing guess of {} letters", guess.chars().count());
                ctx.props().on_commit.emit(guess);
                false
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let props = ctx.props();
        let class = classes!("guess", props.tone.class(), props.locked.then_some("locked"));

        html! {
            <div {class}>
                {
                    for self.letters.iter().zip(&self.boxes).enumerate().map(|(index, (letter, node))| {
                        let onkeydown = ctx.link().batch_callback(move |e: KeyboardEvent| {
                            let modified = e.ctrl_key() || e.meta_key() || e.alt_key();
                            let action = KeyAction::from_key(&e.key(), modified, index);
                            if action.is_some() {
                                e.prevent_default();
                            }
                            action
                        });
                        let value: String = letter.iter().flat_map(|c| c.to_uppercase()).collect();
                        html! {
                            <>
                                if props.info.needs_spacer(index) {
                                    <span class="spacer"/>
                                }
                                <input
                                    ref={node.clone()}
                                    type="text"
                                    maxlength="1"
                                    autocomplete="off"
                                    readonly={props.locked}
                                    {value}
                                    {onkeydown}
                                />
                            </>
                        }
                    })
                }
            </div>
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(KeyAction::from_key("Enter", false, 2), Some(KeyAction::Commit));
        assert_eq!(KeyAction::from_key("Backspace", false, 2), Some(KeyAction::Erase(2)));
        assert_eq!(KeyAction::from_key("q", false, 0), Some(KeyAction::Letter(0, 'q')));
        assert_eq!(KeyAction::from_key("é", false, 1), Some(KeyAction::Letter(1, 'é')));
        assert_eq!(KeyAction::from_key("ß", false, 1), Some(KeyAction::Letter(1, 'ß')));
        assert_eq!(KeyAction::from_key("Shift", false, 0), None);
        assert_eq!(KeyAction::from_key(" ", false, 0), None);
    }

    #[test]
    fn shortcuts_reach_the_browser() {
        assert_eq!(KeyAction::from_key("r", true, 0), None);
        assert_eq!(KeyAction::from_key("v", true, 3), None);
        assert_eq!(KeyAction::from_key("Enter", true, 0), None);
    }

    #[test]
    fn letters_keep_their_full_uppercase() {
        let letters = [Some('s'), Some('t'), Some('ß'), Some('e')];
        assert_eq!(compose_guess(&letters), "STSSE");
    }
}
