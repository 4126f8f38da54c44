use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing::Subscriber;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::FmtSubscriber;

mod parse;
pub use parse::*;

mod permutation;
pub use permutation::*;

mod partition;
pub use partition::*;

mod forest;
pub use forest::*;

mod group;
pub use group::*;

mod invariant;
pub use invariant::*;

mod refinable;
pub use refinable::*;

mod equitable;
pub use equitable::*;

mod canon;
pub use canon::*;

mod report;
pub use report::*;

mod table;
pub use table::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    H,
    B,
    BAromatic,
    C,
    CAromatic,
    N,
    NAromatic,
    O,
    OAromatic,
    F,
    Si,
    P,
    PAromatic,
    S,
    SAromatic,
    Cl,
    Br,
    I,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

pub type MoleculeGraph = petgraph::graph::UnGraph<Element, Bond>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown element symbol '{0}'")]
pub struct UnknownElement(pub String);

lazy_static! {
    /// SMILES atom tokens. Lowercase tokens are the aromatic forms.
    static ref SMILES_ELEMENTS: HashMap<&'static str, Element> = {
        use Element::*;
        HashMap::from([
            ("H", H), ("B", B), ("b", BAromatic), ("C", C), ("c", CAromatic),
            ("N", N), ("n", NAromatic), ("O", O), ("o", OAromatic), ("F", F),
            ("Si", Si), ("P", P), ("p", PAromatic), ("S", S), ("s", SAromatic),
            ("Cl", Cl), ("Br", Br), ("I", I),
        ])
    };
}

impl Element {
    pub fn from_smiles(token: &str) -> Result<Self, UnknownElement> {
        SMILES_ELEMENTS
            .get(token)
            .copied()
            .ok_or_else(|| UnknownElement(token.to_string()))
    }

    /// The element symbol. Aromatic atoms share the symbol of their element.
    pub fn symbol(&self) -> &'static str {
        use Element::*;
        match self {
            H => "H",
            B | BAromatic => "B",
            C | CAromatic => "C",
            N | NAromatic => "N",
            O | OAromatic => "O",
            F => "F",
            Si => "Si",
            P | PAromatic => "P",
            S | SAromatic => "S",
            Cl => "Cl",
            Br => "Br",
            I => "I",
        }
    }

    pub fn is_aromatic(&self) -> bool {
        use Element::*;
        matches!(self, BAromatic | CAromatic | NAromatic | OAromatic | PAromatic | SAromatic)
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

impl Bond {
    /// The numeric bond order; aromatic bonds are reserved the value 5.
    pub fn order(&self) -> usize {
        match self {
            Bond::Single => 1,
            Bond::Double => 2,
            Bond::Triple => 3,
            Bond::Aromatic => 5,
        }
    }
}

/// A fmt subscriber at `level` writing to `writer`.
pub fn log_subscriber<W>(level: LevelFilter, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(writer)
        .finish()
}

/// Install a global `tracing` subscriber at the given level ("error" through "trace").
/// Unknown levels fall back to "info"; a second call is a no-op.
///
/// Logs go to stderr so they never mix with the tables the binaries print.
pub fn init_logging(level: &str) {
    let level = level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO);
    #[cfg(not(test))]
    let subscriber = log_subscriber(level, std::io::stderr);
    #[cfg(test)]
    let subscriber = log_subscriber(level, tracing_subscriber::fmt::TestWriter::new());
    let _ = subscriber.try_init();
}
