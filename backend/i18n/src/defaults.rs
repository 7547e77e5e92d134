//! Built-in dictionaries.
//!
//! These ship with the crate so the console renderer always has a complete
//! vocabulary; folder-based dictionaries layer on top and may override any
//! top-level section.

use crate::dictionary::Dictionary;

pub const BUILTIN_LANGS: [&str; 2] = ["en", "id"];

const EN_YAML: &str = r#"
cmd:
  not_found: "Command not found: `{requested}`"
  did_you_mean: "Did you mean: {suggest}?"
  try_help: "Try: `{cmd} --help`"

help:
  root:
    title: "*Available Commands*"
  group:
    title: "*Available commands for the* `{cmd}` *namespace*:"
  leaf:
    title: "*Command:* `{cmd}`"
  subcommands: "*Subcommands:*"
  usage: "*Usage:*"
  args: "*Arguments:*"
  opts: "*Options:*"
  global_opts: "*Global options:*"
  description: "*Description:*"

arg:
  missing: "Missing argument(s): {items}"
  too_many: "Too many arguments."
  invalid: "Invalid argument(s): {items}"

opt:
  missing: "Missing required option(s): {items}"
  invalid: "Invalid option value: {items}"

unauthorize:
  title: "**Access Denied**"
  message: "You are not allowed to run this command."

ok: ""

prompt:
  default: "Enter a value for {type} *`{text}`*:"

hint:
  cancel: "_Send any `/command` to abort._"
"#;

const ID_YAML: &str = r#"
cmd:
  not_found: "Perintah `{requested}` tidak ditemukan"
  did_you_mean: "Mungkin maksud kamu: {suggest}?"
  try_help: "Coba: `{cmd} --help`"

help:
  root:
    title: "*Daftar Perintah*"
  group:
    title: "*Daftar Perintah yang tersedia untuk* `{cmd}`:"
  leaf:
    title: "*Perintah:* `{cmd}`"
  subcommands: "*Subcommand:*"
  usage: "*Cara pakai:*"
  args: "*Argument:*"
  opts: "*Option:*"
  global_opts: "*Global option:*"
  description: "*Keterangan:*"

arg:
  missing: "Argument kurang: {items}"
  too_many: "Terlalu banyak argument."
  invalid: "Argument tidak valid: {items}"

opt:
  missing: "Option wajib belum ada: {items}"
  invalid: "Value option tidak valid: {items}"

unauthorize:
  title: "**Akses Ditolak**"
  message: "Kamu tidak memiliki izin untuk menjalankan perintah ini."

ok: ""

prompt:
  default: "Masukkan nilai untuk {type} *`{text}`*:"

hint:
  cancel: "_Kirim `/command` apa saja untuk membatalkan._"
"#;

/// Built-in dictionary for a language, if one ships with the crate.
pub fn builtin(lang: &str) -> Option<Dictionary> {
    let yaml = match lang {
        "en" => EN_YAML,
        "id" => ID_YAML,
        _ => return None,
    };
    // The constants are part of the crate; failing to parse them is a bug.
    let value: serde_json::Value =
        serde_yaml::from_str(yaml).unwrap_or(serde_json::Value::Null);
    Dictionary::from_value(value)
}
