//! Resolve a collection of names to exactly one name
//!
//! A filter narrows the candidates by substring; a single remaining
//! candidate is returned without asking, anything more is handed to a
//! [`Picker`] for interactive disambiguation.

use crate::{CoreError, Result};
use std::io::{BufRead, Write};

/// Outcome of narrowing a candidate list without user interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    One(String),
    /// More than one candidate remains, sorted; the user has to choose
    Ambiguous(Vec<String>),
}

/// Interactive disambiguation between sorted candidates
pub trait Picker {
    /// Return the chosen item verbatim
    fn pick(&mut self, prompt: &str, items: &[String]) -> Result<String>;
}

/// Apply `filter` (case-sensitive substring) and sort what remains
///
/// Fails with [`CoreError::NoMatch`] when the filter matches nothing.
pub fn narrow<I, S>(items: I, filter: Option<&str>) -> Result<Selection>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut items: Vec<String> = items.into_iter().map(Into::into).collect();
    items.sort();
    items.dedup();

    if let Some(filter) = filter.filter(|f| !f.is_empty()) {
        items.retain(|item| item.contains(filter));
        if items.is_empty() {
            return Err(CoreError::NoMatch(filter.to_string()));
        }
    }

    if items.len() == 1 {
        return Ok(Selection::One(items.remove(0)));
    }
    Ok(Selection::Ambiguous(items))
}

/// Resolve `items` to exactly one name, asking `picker` only when needed
pub fn select_item<I, S, P>(
    items: I,
    prompt: &str,
    filter: Option<&str>,
    picker: &mut P,
) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    P: Picker + ?Sized,
{
    match narrow(items, filter)? {
        Selection::One(item) => Ok(item),
        Selection::Ambiguous(items) if items.is_empty() => {
            Err(CoreError::NoItems(prompt.trim().trim_end_matches(':').to_string()))
        }
        Selection::Ambiguous(items) => {
            let chosen = picker.pick(prompt, &items)?;
            if items.contains(&chosen) {
                Ok(chosen)
            } else {
                tracing::debug!("Picker returned {:?}, not one of the candidates", chosen);
                Err(CoreError::Cancelled)
            }
        }
    }
}

/// Numbered prompt: lists `1: item` lines and reads an index until a valid
/// one is entered
pub struct NumberedPicker<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> NumberedPicker<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Consume the picker, returning what was written
    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Picker for NumberedPicker<R, W> {
    fn pick(&mut self, prompt: &str, items: &[String]) -> Result<String> {
        loop {
            for (idx, item) in items.iter().enumerate() {
                writeln!(self.output, "{}: {}", idx + 1, item)?;
            }
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(CoreError::Cancelled);
            }

            let entered = line.trim();
            if !entered.is_empty() && entered.bytes().all(|b| b.is_ascii_digit()) {
                if let Some(item) = entered
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|idx| items.get(idx))
                {
                    return Ok(item.clone());
                }
            }
            writeln!(self.output, "Entered wrong value")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Picker that must not be consulted
    struct NoPrompt;

    impl Picker for NoPrompt {
        fn pick(&mut self, _prompt: &str, items: &[String]) -> Result<String> {
            panic!("unexpected prompt for {:?}", items);
        }
    }

    fn numbered(input: &str) -> NumberedPicker<Cursor<Vec<u8>>, Vec<u8>> {
        NumberedPicker::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_filter_narrows_to_single_item() {
        let items = ["prod.be-g8-1", "staging.be-g8-2", "dev.local"];
        let chosen = select_item(items, "Select environment: ", Some("staging"), &mut NoPrompt);
        assert_eq!(chosen.unwrap(), "staging.be-g8-2");
    }

    #[test]
    fn test_single_item_returned_without_prompt() {
        let chosen = select_item(["only"], "Select: ", None, &mut NoPrompt);
        assert_eq!(chosen.unwrap(), "only");
    }

    #[test]
    fn test_filter_without_match_fails() {
        let err = select_item(["alpha", "beta"], "Select: ", Some("gamma"), &mut NoPrompt)
            .unwrap_err();
        assert!(matches!(err, CoreError::NoMatch(ref f) if f == "gamma"));
        assert_eq!(err.to_string(), "Could not find item with filter gamma");
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let err = narrow(["Alpha"], Some("alpha")).unwrap_err();
        assert!(matches!(err, CoreError::NoMatch(_)));
    }

    #[test]
    fn test_narrow_sorts_ambiguous_candidates() {
        let selection = narrow(["web2", "db", "web1"], Some("web")).unwrap();
        assert_eq!(
            selection,
            Selection::Ambiguous(vec!["web1".to_string(), "web2".to_string()])
        );
    }

    #[test]
    fn test_every_result_contains_filter() {
        let items = ["alpha", "alphabet", "beta", "gamma"];
        for filter in ["a", "alp", "bet", "mm"] {
            let mut picker = numbered("1\n");
            let chosen = select_item(items, "> ", Some(filter), &mut picker).unwrap();
            assert!(items.contains(&chosen.as_str()));
            assert!(chosen.contains(filter));
        }
    }

    #[test]
    fn test_empty_collection_fails() {
        let err = select_item(Vec::<String>::new(), "Select node: ", None, &mut NoPrompt)
            .unwrap_err();
        assert!(matches!(err, CoreError::NoItems(ref what) if what == "Select node"));
    }

    #[test]
    fn test_numbered_picker_retries_invalid_entries() {
        let mut picker = numbered("abc\n0\n9\n2\n");
        let chosen = select_item(["b", "a", "c"], "Select: ", None, &mut picker).unwrap();
        assert_eq!(chosen, "b");

        let output = String::from_utf8(picker.into_output()).unwrap();
        assert!(output.starts_with("1: a\n2: b\n3: c\nSelect: "));
        assert_eq!(output.matches("Entered wrong value").count(), 3);
    }

    #[test]
    fn test_numbered_picker_end_of_input_cancels() {
        let mut picker = numbered("");
        let err = select_item(["a", "b"], "Select: ", None, &mut picker).unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }

    #[test]
    fn test_picker_answer_must_be_a_candidate() {
        struct Stray;
        impl Picker for Stray {
            fn pick(&mut self, _prompt: &str, _items: &[String]) -> Result<String> {
                Ok(String::new())
            }
        }
        let err = select_item(["a", "b"], "Select: ", None, &mut Stray).unwrap_err();
        assert!(matches!(err, CoreError::Cancelled));
    }
}
