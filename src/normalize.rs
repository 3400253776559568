//! Question-format normalization.
//!
//! The question store accumulated several representations over time:
//!   - legacy string arrays with a separate numeric `correct_answer` index
//!   - an even older variant keeping the strings in an `options` column
//!   - "enhanced" object arrays where each option carries `is_correct`
//!   - a nested enhanced form wrapping the array with shuffle/multi metadata
//!   - any of the above JSON-encoded into a string, plus outright corrupt
//!     sentinels such as `"[object Object]"`
//!
//! `normalize` reconciles all of them into one `NormalizedQuestion`. It never
//! fails: unrecoverable input degrades to placeholder options with a
//! warning-class log instead of breaking question rendering.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::domain::{AnswerOption, NormalizedQuestion};

/// Bound on `answer_options` strings that decode to yet another string.
/// Each level strips one layer of encoding; real data stops at one.
const ENCODED_DEPTH_LIMIT: usize = 4;

/// Untrusted question row as it arrives from the store or the config bank.
/// `answer_options`, `options` and `correct_answer` stay dynamic because the
/// shapes genuinely vary; classification happens in [`normalize`].
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawQuestionRecord {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub quiz_id: Option<String>,
    #[serde(default, alias = "questionText")]
    pub question_text: Option<String>,
    #[serde(default)]
    pub answer_options: Option<Value>,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub correct_answer: Option<Value>,
}

/// Ids in store rows show up both as strings and as bare integers.
pub(crate) fn string_or_number<'de, D>(de: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(de)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

/// Recognized raw shapes, in dispatch priority order. The order matters:
/// the formats are structurally ambiguous (an enhanced array is also "an
/// array"), so the first matching classification wins.
enum RawShape {
    NestedEnhanced {
        options: Vec<Value>,
        shuffle_answers: bool,
        multiple_correct: bool,
    },
    DirectEnhanced {
        options: Vec<Value>,
    },
    LegacyStrings {
        options: Vec<Value>,
    },
    OptionsField {
        options: Vec<Value>,
    },
    Encoded {
        payload: String,
    },
}

/// Option as extracted from the raw value, before invariants are enforced.
#[derive(Clone, Debug, Default)]
struct ProvisionalOption {
    id: Option<String>,
    text: Option<String>,
    is_correct: bool,
    explanation: Option<String>,
}

fn classify(record: &RawQuestionRecord) -> Option<RawShape> {
    let raw = record.answer_options.as_ref();
    as_nested_enhanced(raw)
        .or_else(|| as_direct_enhanced(raw))
        .or_else(|| as_legacy_array(raw))
        .or_else(|| as_options_field(record.options.as_ref()))
        .or_else(|| as_encoded_string(raw))
}

/// `answer_options` is an object wrapping a nested `answer_options` array.
/// Shuffling defaults to true here (absence means "assume shufflable").
fn as_nested_enhanced(value: Option<&Value>) -> Option<RawShape> {
    let obj = value?.as_object()?;
    let inner = obj.get("answer_options")?.as_array()?;
    Some(RawShape::NestedEnhanced {
        options: inner.clone(),
        shuffle_answers: !matches!(obj.get("shuffle_answers"), Some(Value::Bool(false))),
        multiple_correct: matches!(obj.get("multiple_correct"), Some(Value::Bool(true))),
    })
}

/// `answer_options` is already an array of option objects. Shuffling stays
/// off in this path: these rows predate the shuffle rollout and their
/// deployed behavior must not silently change.
fn as_direct_enhanced(value: Option<&Value>) -> Option<RawShape> {
    let arr = value?.as_array()?;
    if arr.first()?.as_object()?.contains_key("is_correct") {
        Some(RawShape::DirectEnhanced { options: arr.clone() })
    } else {
        None
    }
}

fn as_legacy_array(value: Option<&Value>) -> Option<RawShape> {
    Some(RawShape::LegacyStrings { options: value?.as_array()?.clone() })
}

fn as_options_field(value: Option<&Value>) -> Option<RawShape> {
    Some(RawShape::OptionsField { options: value?.as_array()?.clone() })
}

fn as_encoded_string(value: Option<&Value>) -> Option<RawShape> {
    Some(RawShape::Encoded { payload: value?.as_str()?.to_string() })
}

/// Normalize one raw record into the canonical question shape.
///
/// Total: malformed input yields the 4-option placeholder (option 0 correct)
/// rather than an error, so a corrupt row can never take down a quiz.
pub fn normalize(record: &RawQuestionRecord) -> NormalizedQuestion {
    normalize_at_depth(record, 0)
}

fn normalize_at_depth(record: &RawQuestionRecord, depth: usize) -> NormalizedQuestion {
    let correct_index = record.correct_answer.as_ref().and_then(Value::as_i64);
    let mut shuffle_answers = false;
    let mut multiple_correct = false;

    let mut provisional = match classify(record) {
        Some(RawShape::NestedEnhanced { options, shuffle_answers: shuffle, multiple_correct: multiple }) => {
            shuffle_answers = shuffle;
            multiple_correct = multiple;
            options.iter().map(enhanced_option).collect()
        }
        Some(RawShape::DirectEnhanced { options }) => options.iter().map(enhanced_option).collect(),
        Some(RawShape::LegacyStrings { options }) | Some(RawShape::OptionsField { options }) => {
            // Absent or non-numeric index defaults to the first option.
            let correct = correct_index.unwrap_or(0);
            options
                .iter()
                .enumerate()
                .map(|(index, value)| scalar_option(value, index as i64 == correct))
                .collect()
        }
        Some(RawShape::Encoded { payload }) => {
            if depth >= ENCODED_DEPTH_LIMIT {
                warn!(target: "question", id = ?record.id, depth, "answer_options string nested too deep; using placeholder options");
                placeholder_options()
            } else {
                match serde_json::from_str::<Value>(&payload) {
                    Ok(parsed) => {
                        let mut reparsed = record.clone();
                        reparsed.answer_options = Some(parsed);
                        return normalize_at_depth(&reparsed, depth + 1);
                    }
                    Err(err) => {
                        warn!(target: "question", id = ?record.id, error = %err, "Unparseable answer_options string; using placeholder options");
                        placeholder_options()
                    }
                }
            }
        }
        None => {
            warn!(target: "question", id = ?record.id, "Unrecognized answer_options shape; using placeholder options");
            placeholder_options()
        }
    };

    if provisional.is_empty() {
        warn!(target: "question", id = ?record.id, "Question has an empty option set; using placeholder options");
        provisional = placeholder_options();
    }

    // Explicit "no known answer" sentinel: default to the first option rather
    // than leaving every option wrong and the question unwinnable.
    if correct_index == Some(-1) && !provisional.iter().any(|o| o.is_correct) {
        warn!(target: "question", id = ?record.id, "correct_answer is -1 with no is_correct flags; marking first option correct");
        if let Some(first) = provisional.first_mut() {
            first.is_correct = true;
        }
    }

    let answer_options = finalize_options(provisional);
    let has_explanations = answer_options.iter().any(|o| o.explanation.is_some());

    NormalizedQuestion {
        id: record.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
        question_text: record.question_text.clone().unwrap_or_default(),
        answer_options,
        shuffle_answers,
        multiple_correct,
        has_explanations,
    }
}

fn enhanced_option(value: &Value) -> ProvisionalOption {
    match value {
        Value::Object(obj) => ProvisionalOption {
            id: obj.get("id").and_then(Value::as_str).map(str::to_string),
            text: obj.get("text").and_then(Value::as_str).map(str::to_string),
            is_correct: matches!(obj.get("is_correct"), Some(Value::Bool(true))),
            explanation: obj.get("explanation").and_then(Value::as_str).map(str::to_string),
        },
        other => ProvisionalOption { text: scalar_text(other), ..ProvisionalOption::default() },
    }
}

fn scalar_option(value: &Value, is_correct: bool) -> ProvisionalOption {
    ProvisionalOption { text: scalar_text(value), is_correct, ..ProvisionalOption::default() }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn placeholder_options() -> Vec<ProvisionalOption> {
    ["Option A", "Option B", "Option C", "Option D"]
        .iter()
        .enumerate()
        .map(|(index, text)| ProvisionalOption {
            text: Some((*text).to_string()),
            is_correct: index == 0,
            ..ProvisionalOption::default()
        })
        .collect()
}

/// Enforce per-option invariants whatever branch produced them: positional
/// id when missing, fallback text, strictly boolean correctness, and
/// explanations only when non-empty.
fn finalize_options(provisional: Vec<ProvisionalOption>) -> Vec<AnswerOption> {
    provisional
        .into_iter()
        .enumerate()
        .map(|(index, opt)| AnswerOption {
            id: opt
                .id
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| position_id(index)),
            text: opt
                .text
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| format!("Option {}", index + 1)),
            is_correct: opt.is_correct,
            explanation: opt.explanation.filter(|s| !s.trim().is_empty()),
        })
        .collect()
}

/// Positional option id: a, b, ..., z, aa, ab, ...
fn position_id(index: usize) -> String {
    let mut n = index;
    let mut out = String::new();
    loop {
        out.insert(0, (b'a' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawQuestionRecord {
        serde_json::from_value(value).expect("raw record")
    }

    fn texts(q: &NormalizedQuestion) -> Vec<&str> {
        q.answer_options.iter().map(|o| o.text.as_str()).collect()
    }

    #[test]
    fn legacy_string_array_resolves_correct_index() {
        let q = normalize(&record(json!({
            "id": 7,
            "question_text": "2+2?",
            "answer_options": ["3", "4", "5"],
            "correct_answer": 1
        })));

        assert_eq!(q.id, "7");
        assert_eq!(q.question_text, "2+2?");
        assert_eq!(texts(&q), vec!["3", "4", "5"]);
        let ids: Vec<_> = q.answer_options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        let correct: Vec<_> = q.answer_options.iter().map(|o| o.is_correct).collect();
        assert_eq!(correct, vec![false, true, false]);
        assert!(!q.shuffle_answers);
        assert!(!q.multiple_correct);
        assert!(!q.has_explanations);
    }

    #[test]
    fn legacy_defaults_to_first_option_without_index() {
        let q = normalize(&record(json!({ "answer_options": ["yes", "no"] })));
        assert!(q.answer_options[0].is_correct);
        assert!(!q.answer_options[1].is_correct);

        // A non-numeric index behaves like an absent one.
        let q = normalize(&record(json!({ "answer_options": ["yes", "no"], "correct_answer": "2" })));
        assert!(q.answer_options[0].is_correct);
    }

    #[test]
    fn old_options_field_is_honored() {
        let q = normalize(&record(json!({
            "options": ["red", "green", "blue"],
            "correct_answer": 2
        })));
        assert_eq!(texts(&q), vec!["red", "green", "blue"]);
        assert!(q.answer_options[2].is_correct);
    }

    #[test]
    fn direct_enhanced_keeps_flags_and_stays_unshuffled() {
        let q = normalize(&record(json!({
            "answer_options": [
                { "id": "a", "text": "London", "is_correct": false },
                { "id": "b", "text": "Paris", "is_correct": true, "explanation": "Capital since 987 AD" }
            ]
        })));
        assert!(!q.shuffle_answers);
        assert!(!q.multiple_correct);
        assert!(q.answer_options[1].is_correct);
        assert!(q.has_explanations);
        assert_eq!(q.answer_options[1].explanation.as_deref(), Some("Capital since 987 AD"));
    }

    #[test]
    fn nested_enhanced_reads_metadata_with_shuffle_default_true() {
        let q = normalize(&record(json!({
            "answer_options": {
                "answer_options": [
                    { "id": "a", "text": "2", "is_correct": true },
                    { "id": "b", "text": "3", "is_correct": true },
                    { "id": "c", "text": "4", "is_correct": false }
                ],
                "multiple_correct": true
            }
        })));
        assert!(q.shuffle_answers, "absent shuffle_answers means shufflable");
        assert!(q.multiple_correct);
        assert_eq!(q.correct_options().len(), 2);

        let q = normalize(&record(json!({
            "answer_options": {
                "answer_options": [{ "id": "a", "text": "x", "is_correct": true }],
                "shuffle_answers": false
            }
        })));
        assert!(!q.shuffle_answers);
    }

    #[test]
    fn nested_wins_over_direct_dispatch() {
        // The wrapper object is the nested format even though the inner
        // array would also classify as direct enhanced.
        let q = normalize(&record(json!({
            "answer_options": {
                "answer_options": [
                    { "id": "a", "text": "x", "is_correct": true },
                    { "id": "b", "text": "y", "is_correct": false }
                ]
            }
        })));
        assert!(q.shuffle_answers, "nested default applies, not the direct-path default");
    }

    #[test]
    fn json_encoded_string_recurses_into_real_format() {
        let q = normalize(&record(json!({
            "answer_options": "[\"3\", \"4\", \"5\"]",
            "correct_answer": 1
        })));
        assert_eq!(texts(&q), vec!["3", "4", "5"]);
        assert!(q.answer_options[1].is_correct);

        let q = normalize(&record(json!({
            "answer_options": "{\"answer_options\":[{\"id\":\"a\",\"text\":\"x\",\"is_correct\":true}],\"shuffle_answers\":true}"
        })));
        assert!(q.shuffle_answers);
        assert_eq!(texts(&q), vec!["x"]);
    }

    #[test]
    fn corrupt_sentinel_string_yields_placeholder() {
        let q = normalize(&record(json!({ "answer_options": "[object Object]" })));
        assert_eq!(texts(&q), vec!["Option A", "Option B", "Option C", "Option D"]);
        assert!(q.answer_options[0].is_correct);
        assert!(q.answer_options.iter().skip(1).all(|o| !o.is_correct));

        let q = normalize(&record(json!({ "answer_options": "undefined" })));
        assert_eq!(q.answer_options.len(), 4);
    }

    #[test]
    fn encoded_null_falls_through_to_placeholder() {
        // "null" parses as JSON, then matches no recognized shape.
        let q = normalize(&record(json!({ "answer_options": "null" })));
        assert_eq!(texts(&q), vec!["Option A", "Option B", "Option C", "Option D"]);
    }

    #[test]
    fn missing_and_empty_option_sets_yield_placeholder() {
        let q = normalize(&record(json!({ "question_text": "?" })));
        assert_eq!(q.answer_options.len(), 4);
        assert!(q.answer_options[0].is_correct);

        let q = normalize(&record(json!({ "answer_options": [] })));
        assert_eq!(q.answer_options.len(), 4);
    }

    #[test]
    fn minus_one_sentinel_marks_first_option_correct() {
        let q = normalize(&record(json!({
            "answer_options": ["a", "b", "c"],
            "correct_answer": -1
        })));
        assert!(q.answer_options[0].is_correct);
        assert_eq!(q.correct_options().len(), 1);

        // With a flag already present the sentinel changes nothing.
        let q = normalize(&record(json!({
            "answer_options": [
                { "text": "a", "is_correct": false },
                { "text": "b", "is_correct": true }
            ],
            "correct_answer": -1
        })));
        assert!(!q.answer_options[0].is_correct);
        assert!(q.answer_options[1].is_correct);
    }

    #[test]
    fn option_invariants_are_enforced_on_sloppy_enhanced_rows() {
        let q = normalize(&record(json!({
            "answer_options": [
                { "is_correct": true },
                { "id": "", "text": "  ", "is_correct": false, "explanation": "" },
                { "text": "fine", "is_correct": false, "explanation": "   " }
            ]
        })));
        assert_eq!(q.answer_options[0].id, "a");
        assert_eq!(q.answer_options[0].text, "Option 1");
        assert_eq!(q.answer_options[1].id, "b");
        assert_eq!(q.answer_options[1].text, "Option 2");
        assert_eq!(q.answer_options[2].text, "fine");
        assert!(q.answer_options.iter().all(|o| o.explanation.is_none()));
        assert!(!q.has_explanations);
    }

    #[test]
    fn question_text_alias_is_accepted() {
        let q = normalize(&record(json!({
            "questionText": "Capital of France?",
            "answer_options": ["Paris"]
        })));
        assert_eq!(q.question_text, "Capital of France?");
    }

    #[test]
    fn every_recognized_format_produces_a_winnable_question() {
        let raws = vec![
            json!({ "answer_options": ["x", "y"], "correct_answer": 0 }),
            json!({ "options": ["x", "y"], "correct_answer": 1 }),
            json!({ "answer_options": [{ "text": "x", "is_correct": true }] }),
            json!({ "answer_options": { "answer_options": [{ "text": "x", "is_correct": true }] } }),
            json!({ "answer_options": "[\"x\", \"y\"]" }),
            json!({ "answer_options": "[object Object]" }),
        ];
        for raw in raws {
            let q = normalize(&record(raw.clone()));
            assert!(!q.answer_options.is_empty(), "empty options for {raw}");
            assert!(
                q.answer_options.iter().any(|o| o.is_correct),
                "no correct option for {raw}"
            );
        }
    }

    #[test]
    fn normalization_is_idempotent_across_round_trips() {
        let first = normalize(&record(json!({
            "id": "q1",
            "question_text": "2+2?",
            "answer_options": ["3", "4", "5"],
            "correct_answer": 1
        })));

        // Re-encode the canonical form as a nested enhanced row and run it
        // through again; the option set must be unchanged.
        let reencoded = record(json!({
            "id": "q1",
            "question_text": first.question_text,
            "answer_options": {
                "answer_options": serde_json::to_value(&first.answer_options).unwrap(),
                "shuffle_answers": first.shuffle_answers,
                "multiple_correct": first.multiple_correct
            }
        }));
        let second = normalize(&reencoded);
        assert_eq!(first.answer_options, second.answer_options);
        assert_eq!(first.multiple_correct, second.multiple_correct);
    }

    #[test]
    fn positional_ids_extend_past_the_alphabet() {
        assert_eq!(position_id(0), "a");
        assert_eq!(position_id(25), "z");
        assert_eq!(position_id(26), "aa");
        assert_eq!(position_id(27), "ab");
    }
}
