use super::Transform;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CaseMode {
    Upper,
    Lower,
    Toggle,
}

/// ASCII case folding. Bytes outside `A-Z`/`a-z` pass through untouched.
#[derive(Debug)]
pub struct CaseFold {
    mode: CaseMode,
    changes: u64,
}

impl CaseFold {
    pub fn new(mode: CaseMode) -> Self {
        Self { mode, changes: 0 }
    }

    fn fold(&self, byte: u8) -> u8 {
        match self.mode {
            CaseMode::Upper => byte.to_ascii_uppercase(),
            CaseMode::Lower => byte.to_ascii_lowercase(),
            CaseMode::Toggle if byte.is_ascii_uppercase() => byte.to_ascii_lowercase(),
            CaseMode::Toggle => byte.to_ascii_uppercase(),
        }
    }
}

impl Transform for CaseFold {
    fn feed(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len());
        for &byte in input {
            let folded = self.fold(byte);
            if folded != byte {
                self.changes += 1;
            }
            out.push(folded);
        }
    }

    fn finish(&mut self, _out: &mut Vec<u8>) {}

    fn changes(&self) -> u64 {
        self.changes
    }
}
