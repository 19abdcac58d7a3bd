use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::*;

/// HTTP status the puzzle API answers a wrong guess with.
pub const WRONG_GUESS_STATUS: u16 = 406;

/// Layout of the day's answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleInfo {
    pub number_of_chars: usize,
    /// Character positions that start a new word.
    #[serde(default)]
    pub list_of_spacers: Vec<usize>,
}

impl PuzzleInfo {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| GameError::Payload(err.to_string()))
    }

    pub fn needs_spacer(&self, index: usize) -> bool {
        self.list_of_spacers.contains(&index)
    }
}

/// The day's image as delivered by the API: base64 of an encoded JPEG.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePayload {
    pub image: String,
}

impl ImagePayload {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| GameError::Payload(err.to_string()))
    }

    /// Decodes into a hidden buffer ready for [`GameController::on_image_loaded`].
    pub fn decode(&self) -> Result<PixelBuffer> {
        let bytes = STANDARD
            .decode(self.image.trim())
            .map_err(|err| GameError::ImageDecode(err.to_string()))?;
        PixelBuffer::decode_puzzle(&bytes)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionPayload {
    pub solution: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GuessVerdict {
    Correct,
    Wrong,
}

impl GuessVerdict {
    /// Success means correct, [`WRONG_GUESS_STATUS`] means wrong, anything
    /// else is a failure unrelated to the guess itself.
    pub fn from_status(status: u16) -> Result<Self> {
        match status {
            200..=299 => Ok(Self::Correct),
            WRONG_GUESS_STATUS => Ok(Self::Wrong),
            _ => Err(GameError::GuessFailed(status)),
        }
    }

    pub const fn event(self) -> GuessEvent {
        match self {
            Self::Correct => GuessEvent::CorrectGuess,
            Self::Wrong => GuessEvent::WrongGuess,
        }
    }
}

/// Normalizes typed letters into the submitted guess: uppercase, blanks
/// skipped.
pub fn compose_guess<'a>(letters: impl IntoIterator<Item = &'a Option<char>>) -> String {
    letters
        .into_iter()
        .flatten()
        .flat_map(|letter| letter.to_uppercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puzzle_info_reads_api_field_names() {
        let info = PuzzleInfo::from_json(r#"{"numberOfChars": 9, "listOfSpacers": [4]}"#).unwrap();

        assert_eq!(info.number_of_chars, 9);
        assert!(info.needs_spacer(4));
        assert!(!info.needs_spacer(3));
    }

    #[test]
    fn malformed_payload_is_reported() {
        assert!(matches!(
            PuzzleInfo::from_json(r#"{"listOfSpacers": []}"#),
            Err(GameError::Payload(_))
        ));
    }

    #[test]
    fn guess_status_mapping() {
        assert_eq!(GuessVerdict::from_status(200), Ok(GuessVerdict::Correct));
        assert_eq!(GuessVerdict::from_status(204), Ok(GuessVerdict::Correct));
        assert_eq!(GuessVerdict::from_status(406), Ok(GuessVerdict::Wrong));
        assert_eq!(GuessVerdict::from_status(500), Err(GameError::GuessFailed(500)));
        assert_eq!(GuessVerdict::Wrong.event(), GuessEvent::WrongGuess);
    }

    #[test]
    fn image_payload_decodes_into_hidden_buffer() {
        let image = PixelBuffer::filled(SURFACE_SIZE, SURFACE_SIZE, Rgb::new(1, 2, 3));
        let payload = ImagePayload {
            image: STANDARD.encode(image.encode_png().unwrap()),
        };
        let json = serde_json::to_string(&payload).unwrap();

        assert_eq!(ImagePayload::from_json(&json).unwrap().decode().unwrap(), image);
    }

    #[test]
    fn guess_is_uppercased_and_skips_blanks() {
        let letters = [Some('c'), None, Some('a'), Some('T')];
        assert_eq!(compose_guess(&letters), "CAT");
    }
}
