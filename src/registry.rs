use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Where a benchmark's standard input comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputPolicy {
    /// Standard input is closed.
    #[default]
    None,
    /// Standard input is the captured seed payload.
    Seed,
}

/// Invocation settings for one benchmark program.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Argument tokens appended after the script path.
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub input: InputPolicy,
}

impl BenchmarkConfig {
    pub fn new(argument: &str, input: InputPolicy) -> Self {
        Self {
            args: argument.split_whitespace().map(str::to_string).collect(),
            input,
        }
    }
}

/// Program name -> settings; iteration is in key order.
pub type Registry = BTreeMap<String, BenchmarkConfig>;

/// The standard benchmarksgame table.
pub fn default_registry() -> Registry {
    use InputPolicy::{None, Seed};

    [
        ("binarytrees", "14", None),
        ("fannkuchredux", "9", None),
        ("fasta", "400000", None),
        ("knucleotide", "", Seed),
        ("mandelbrot", "800", None),
        ("nbody", "100000", None),
        ("pidigits", "10000", None),
        ("regexredux", "", Seed),
        ("revcomp", "", Seed),
        ("spectralnorm", "500", None),
    ]
    .into_iter()
    .map(|(program, arg, input)| (program.to_string(), BenchmarkConfig::new(arg, input)))
    .collect()
}

/// True if any entry consumes the seed payload.
pub fn needs_seed<'a>(entries: impl IntoIterator<Item = &'a BenchmarkConfig>) -> bool {
    entries.into_iter().any(|b| b.input == InputPolicy::Seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_contents() {
        let reg = default_registry();
        assert_eq!(reg.len(), 10);

        assert_eq!(reg["nbody"].args, vec!["100000"]);
        assert_eq!(reg["nbody"].input, InputPolicy::None);

        for program in ["knucleotide", "regexredux", "revcomp"] {
            assert_eq!(reg[program].input, InputPolicy::Seed, "{program}");
            assert!(reg[program].args.is_empty(), "{program}");
        }
    }

    #[test]
    fn test_registry_iterates_in_key_order() {
        let reg = default_registry();
        let names: Vec<&str> = reg.keys().map(String::as_str).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.first(), Some(&"binarytrees"));
        assert_eq!(names.last(), Some(&"spectralnorm"));
    }

    #[test]
    fn test_needs_seed() {
        let reg = default_registry();
        assert!(needs_seed(reg.values()));
        assert!(!needs_seed(
            reg.values().filter(|b| b.input == InputPolicy::None)
        ));
    }
}
