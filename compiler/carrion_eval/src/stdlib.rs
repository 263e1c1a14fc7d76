//! The embedded standard library.
//!
//! The real Carrion runtime implements these grimoires natively; the
//! language server only needs their shapes in the environment so the
//! catalog loader can enumerate names, methods, and arities. Bodies that
//! would need native support are `ignore` stubs; they are never executed
//! on behalf of an editor.

use crate::{eval_program, Environment, EvalError};

/// Carrion source for the bundled grimoires.
pub const STDLIB_SOURCE: &str = r#"grim String:
    """String manipulation grimoire"""
    init(value):
        self.value = value
    spell length():
        ignore
    spell lower():
        ignore
    spell upper():
        ignore
    spell reverse():
        ignore
    spell find(substring):
        ignore
    spell contains(substring):
        ignore
    spell char_at(index):
        ignore
    spell split(separator):
        ignore
    spell join(string_list):
        ignore
    spell strip(characters = " "):
        ignore

grim Array:
    """Array manipulation grimoire"""
    init(elements):
        self.elements = elements
    spell length():
        ignore
    spell append(value):
        ignore
    spell get(index):
        ignore
    spell set(index, value):
        ignore
    spell is_empty():
        ignore
    spell contains(value):
        ignore
    spell index_of(value):
        ignore
    spell remove(value):
        ignore
    spell clear():
        ignore
    spell first():
        ignore
    spell last():
        ignore
    spell slice(start, end):
        ignore
    spell reverse():
        ignore
    spell sort():
        ignore

grim Integer:
    """Integer operations grimoire"""
    init(value):
        self.value = value
    spell to_bin():
        ignore
    spell to_oct():
        ignore
    spell to_hex():
        ignore
    spell abs():
        ignore
    spell pow(exponent):
        ignore
    spell is_even():
        ignore
    spell is_odd():
        ignore
    spell is_prime():
        ignore

grim Float:
    """Float operations grimoire"""
    init(value):
        self.value = value
    spell round(decimals):
        ignore
    spell floor():
        ignore
    spell ceil():
        ignore
    spell abs():
        ignore
    spell sqrt():
        ignore
    spell pow(exponent):
        ignore
    spell sin():
        ignore
    spell cos():
        ignore
    spell is_integer():
        ignore

grim Boolean:
    """Boolean operations grimoire"""
    init(value):
        self.value = value
    spell to_int():
        ignore
    spell negate():
        ignore
    spell and_with(other):
        ignore
    spell or_with(other):
        ignore
    spell xor_with(other):
        ignore

arcane grim File:
    """File operations grimoire"""
    spell read(path):
        ignore
    spell write(path, content):
        ignore
    spell append(path, content):
        ignore
    spell exists(path):
        ignore
    spell open(path, mode = "r"):
        ignore

arcane grim OS:
    """Operating system operations grimoire"""
    spell cwd():
        ignore
    spell listdir(path):
        ignore
    spell mkdir(path):
        ignore
    spell remove(path):
        ignore
    spell getenv(name):
        ignore
    spell setenv(name, value):
        ignore
    spell run(command, args = [], capture = False):
        ignore

arcane grim Time:
    """Time operations grimoire"""
    spell now():
        ignore
    spell now_nano():
        ignore
    spell sleep(seconds):
        ignore
    spell format(timestamp, format):
        ignore
    spell parse(format, time_str):
        ignore
    spell date(timestamp):
        ignore
    spell add_duration(timestamp, seconds):
        ignore
    spell diff(timestamp1, timestamp2):
        ignore
"#;

/// Evaluate the bundled stdlib into `env`.
pub fn load_stdlib(env: &mut Environment) -> Result<(), EvalError> {
    let (program, errors) = carrion_parse::parse(STDLIB_SOURCE);
    if !errors.is_empty() {
        return Err(EvalError::new(format!(
            "stdlib failed to parse: {}",
            errors[0]
        )));
    }
    eval_program(&program, env)?;
    Ok(())
}
