use std::fmt::Write;

use crate::{
  translate::LANGUAGES,
  vocab::{GuessResult, MissedWord, MASTERY_THRESHOLD},
};

static INDEX: &str = include_str!("../templates/index.html");
static REVIEW_MISSED_WORDS: &str = include_str!("../templates/review_missed_words.html");
static REVIEW_RESULTS: &str = include_str!("../templates/review_results.html");

pub fn escape(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#x27;"),
      c => escaped.push(c),
    }
  }
  escaped
}

pub fn index(language: &str) -> String {
  let mut options = String::new();
  for (name, code) in LANGUAGES {
    let selected = if *code == language || *name == language {
      " selected"
    } else {
      ""
    };
    _ = writeln!(
      options,
      r#"      <option value="{}"{selected}>{}</option>"#,
      escape(code),
      escape(name)
    );
  }

  INDEX
    .replace("{{language_options}}", options.trim_end())
    .replace("{{language}}", &escape(language))
}

pub fn review_missed_words(missed_words: &[MissedWord]) -> String {
  let mut rows = String::new();
  if missed_words.is_empty() {
    rows.push_str("    <p>No missed words to review.</p>");
  }
  for word in missed_words {
    _ = writeln!(
      rows,
      r#"    <div>
      <img src="/extracted/{image}" alt="" width="128">
      <span>{english} ({guesses}/{threshold})</span>
      <input type="hidden" name="entity_keys" value="{id}">
      <input type="text" name="guesses" autocomplete="off">
    </div>"#,
      image = escape(&word.image_path),
      english = escape(&word.english_word),
      guesses = word.correct_guesses,
      threshold = MASTERY_THRESHOLD,
      id = escape(&word.id),
    );
  }

  REVIEW_MISSED_WORDS.replace("{{rows}}", rows.trim_end())
}

pub fn review_results(results: &[GuessResult]) -> String {
  let mut rows = String::new();
  for result in results {
    _ = writeln!(
      rows,
      "    <li>{}: {} ({})</li>",
      escape(&result.word),
      escape(&result.guess),
      escape(&result.result)
    );
  }

  REVIEW_RESULTS.replace("{{rows}}", rows.trim_end())
}
