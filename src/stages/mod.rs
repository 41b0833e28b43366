//! Post-parse stages and the composer that orders them.

mod math;
mod mathml;
mod words;

pub use math::{MathError, to_mathml};
pub use words::{WORD_CLASS, WORD_INDEX_ATTR};

use crate::document::Document;

/// A post-parse transform over the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Typeset math literals to MathML.
    MathTypeset,
    /// Wrap each whitespace-delimited word in an addressable span for reveal animation.
    WordSplit,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::MathTypeset => "math-typeset",
            Stage::WordSplit => "word-split",
        }
    }

    pub fn apply(self, doc: &mut Document) {
        match self {
            Stage::MathTypeset => {
                let count = math::typeset(&mut doc.children);
                log::debug!("{}: typeset {} expressions", self.name(), count);
            }
            Stage::WordSplit => {
                let count = words::split_words(&mut doc.children);
                log::debug!("{}: wrapped {} words", self.name(), count);
            }
        }
    }
}

/// Ordered stages. Math typesetting is always first; word splitting, when
/// present, follows it so typeset math is never split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePipeline {
    stages: Vec<Stage>,
}

impl StagePipeline {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Apply every stage in order.
    pub fn run(&self, doc: &mut Document) {
        for stage in &self.stages {
            stage.apply(doc);
        }
    }
}

/// Stages for one render. A pure function of `animated`; callers recompute it per render.
pub fn compose_stages(animated: bool) -> StagePipeline {
    let mut stages = vec![Stage::MathTypeset];
    if animated {
        stages.push(Stage::WordSplit);
    }
    StagePipeline { stages }
}
