// src/types.rs
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Algorithms a NiceHash pool can be asked to serve
///
/// The discriminant is the NiceHash algorithm id, which also fixes the
/// stratum port (`3333 + id`). Variant names are the NiceHash ones, so
/// Ethash appears as `DaggerHashimoto`.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlgorithmType {
    #[value(name = "scrypt")]
    Scrypt = 0,
    #[value(name = "sha256")]
    Sha256 = 1,
    #[value(name = "scryptnf")]
    ScryptNf = 2,
    #[value(name = "x11")]
    X11 = 3,
    #[value(name = "x13")]
    X13 = 4,
    #[value(name = "keccak")]
    Keccak = 5,
    #[value(name = "x15")]
    X15 = 6,
    #[value(name = "nist5")]
    Nist5 = 7,
    #[value(name = "neoscrypt")]
    NeoScrypt = 8,
    #[value(name = "lyra2re")]
    Lyra2RE = 9,
    #[value(name = "whirlpoolx")]
    WhirlpoolX = 10,
    #[value(name = "qubit")]
    Qubit = 11,
    #[value(name = "quark")]
    Quark = 12,
    #[value(name = "axiom")]
    Axiom = 13,
    #[value(name = "lyra2rev2")]
    Lyra2REv2 = 14,
    #[value(name = "scryptjanenf16")]
    ScryptJaneNf16 = 15,
    #[value(name = "blake256r8")]
    Blake256r8 = 16,
    #[value(name = "blake256r14")]
    Blake256r14 = 17,
    #[value(name = "blake256r8vnl")]
    Blake256r8vnl = 18,
    #[value(name = "hodl")]
    Hodl = 19,
    #[value(name = "daggerhashimoto")]
    DaggerHashimoto = 20,
    #[value(name = "decred")]
    Decred = 21,
    #[value(name = "cryptonight")]
    CryptoNight = 22,
    #[value(name = "lbry")]
    Lbry = 23,
    #[value(name = "equihash")]
    Equihash = 24,
    #[value(name = "pascal")]
    Pascal = 25,
    #[value(name = "x11gost")]
    X11Gost = 26,
    #[value(name = "sia")]
    Sia = 27,
    #[value(name = "blake2s")]
    Blake2s = 28,
    #[value(name = "skunk")]
    Skunk = 29,
}

impl AlgorithmType {
    /// Every known algorithm, ordered by NiceHash id
    pub const ALL: [AlgorithmType; 30] = [
        AlgorithmType::Scrypt,
        AlgorithmType::Sha256,
        AlgorithmType::ScryptNf,
        AlgorithmType::X11,
        AlgorithmType::X13,
        AlgorithmType::Keccak,
        AlgorithmType::X15,
        AlgorithmType::Nist5,
        AlgorithmType::NeoScrypt,
        AlgorithmType::Lyra2RE,
        AlgorithmType::WhirlpoolX,
        AlgorithmType::Qubit,
        AlgorithmType::Quark,
        AlgorithmType::Axiom,
        AlgorithmType::Lyra2REv2,
        AlgorithmType::ScryptJaneNf16,
        AlgorithmType::Blake256r8,
        AlgorithmType::Blake256r14,
        AlgorithmType::Blake256r8vnl,
        AlgorithmType::Hodl,
        AlgorithmType::DaggerHashimoto,
        AlgorithmType::Decred,
        AlgorithmType::CryptoNight,
        AlgorithmType::Lbry,
        AlgorithmType::Equihash,
        AlgorithmType::Pascal,
        AlgorithmType::X11Gost,
        AlgorithmType::Sia,
        AlgorithmType::Blake2s,
        AlgorithmType::Skunk,
    ];

    /// NiceHash numeric algorithm id
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Name used both on the command line and as the stratum host prefix
    pub fn name(self) -> &'static str {
        match self {
            AlgorithmType::Scrypt => "scrypt",
            AlgorithmType::Sha256 => "sha256",
            AlgorithmType::ScryptNf => "scryptnf",
            AlgorithmType::X11 => "x11",
            AlgorithmType::X13 => "x13",
            AlgorithmType::Keccak => "keccak",
            AlgorithmType::X15 => "x15",
            AlgorithmType::Nist5 => "nist5",
            AlgorithmType::NeoScrypt => "neoscrypt",
            AlgorithmType::Lyra2RE => "lyra2re",
            AlgorithmType::WhirlpoolX => "whirlpoolx",
            AlgorithmType::Qubit => "qubit",
            AlgorithmType::Quark => "quark",
            AlgorithmType::Axiom => "axiom",
            AlgorithmType::Lyra2REv2 => "lyra2rev2",
            AlgorithmType::ScryptJaneNf16 => "scryptjanenf16",
            AlgorithmType::Blake256r8 => "blake256r8",
            AlgorithmType::Blake256r14 => "blake256r14",
            AlgorithmType::Blake256r8vnl => "blake256r8vnl",
            AlgorithmType::Hodl => "hodl",
            AlgorithmType::DaggerHashimoto => "daggerhashimoto",
            AlgorithmType::Decred => "decred",
            AlgorithmType::CryptoNight => "cryptonight",
            AlgorithmType::Lbry => "lbry",
            AlgorithmType::Equihash => "equihash",
            AlgorithmType::Pascal => "pascal",
            AlgorithmType::X11Gost => "x11gost",
            AlgorithmType::Sia => "sia",
            AlgorithmType::Blake2s => "blake2s",
            AlgorithmType::Skunk => "skunk",
        }
    }
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        AlgorithmType::ALL
            .iter()
            .copied()
            .find(|algo| algo.name() == wanted)
            .ok_or_else(|| format!("Unknown algorithm: {}", s))
    }
}

/// What a miner is currently set up to mine
///
/// `None` means the miner was never started. `Invalid` means the miner
/// exists but its last algorithm is unknown or unusable (e.g. after a
/// teardown). Neither requires a stop before the next start.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum ActiveAlgorithm {
    /// Never started
    #[default]
    None,
    /// Started at some point but not bound to a usable algorithm
    Invalid,
    /// Bound to this algorithm (possibly stopped since)
    Mining(AlgorithmType),
}

impl fmt::Display for ActiveAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveAlgorithm::None => write!(f, "none"),
            ActiveAlgorithm::Invalid => write!(f, "invalid"),
            ActiveAlgorithm::Mining(algo) => write!(f, "{}", algo),
        }
    }
}
