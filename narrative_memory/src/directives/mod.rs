//! Directive Parser - extracts state mutations from model output.
//!
//! Recognised markup, one directive per bracketed span:
//!
//! ```text
//! [UPDATE:PNJ|Nom|émotion|+/-valeur|raison]
//! [SAVE:LIEU|Nom|Description|tags]
//! [SAVE:PNJ|Nom|Rôle|Description|tags]
//! [SAVE:EVENT|Titre|Description|Conséquences|tags]
//! [SAVE:CHAPTER|Titre|Résumé|tags]
//! ```
//!
//! A span that does not fit one of these shapes exactly (unknown head, wrong
//! field count, blank field, non-numeric delta) is left in the visible text.

mod tokenizer;

use serde::{Deserialize, Serialize};

use campaign_state::{Directive, TagSet};

use tokenizer::{bracketed_spans, fields};

/// Model output split into what the player sees and what mutates state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResponse {
    /// Output with every recognised directive span removed, then trimmed.
    pub visible_text: String,
    /// Directives in order of appearance.
    pub directives: Vec<Directive>,
}

impl ParsedResponse {
    pub fn save_count(&self) -> usize {
        self.directives.iter().filter(|d| d.is_save()).count()
    }

    pub fn update_count(&self) -> usize {
        self.directives.len() - self.save_count()
    }
}

/// Parse raw model output.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let mut visible = String::with_capacity(raw.len());
    let mut directives = Vec::new();
    let mut copied_to = 0;

    for span in bracketed_spans(raw) {
        if let Some(directive) = parse_directive(span.body) {
            visible.push_str(&raw[copied_to..span.start]);
            copied_to = span.end;
            directives.push(directive);
        }
    }
    visible.push_str(&raw[copied_to..]);

    ParsedResponse {
        visible_text: visible.trim().to_string(),
        directives,
    }
}

/// Parse the body of one bracketed span.
pub fn parse_directive(body: &str) -> Option<Directive> {
    let (head, f) = fields(body)?;

    let directive = match (head, f.as_slice()) {
        ("UPDATE:PNJ", [nom, axis, delta, reason]) => Directive::UpdateNpcEmotion {
            nom: nom.to_string(),
            axis: axis.to_string(),
            delta: delta.parse().ok()?,
            reason: reason.to_string(),
        },
        ("SAVE:LIEU", [nom, description, tags]) => Directive::SaveLocation {
            nom: nom.to_string(),
            description: description.to_string(),
            tags: TagSet::parse_list(tags),
        },
        ("SAVE:PNJ", [nom, role, description, tags]) => Directive::SaveNpc {
            nom: nom.to_string(),
            role: role.to_string(),
            description: description.to_string(),
            tags: TagSet::parse_list(tags),
        },
        ("SAVE:EVENT", [titre, description, consequences, tags]) => Directive::SaveEvent {
            titre: titre.to_string(),
            description: description.to_string(),
            consequences: consequences.to_string(),
            tags: TagSet::parse_list(tags),
        },
        ("SAVE:CHAPTER", [titre, resume, tags]) => Directive::SaveChapter {
            titre: titre.to_string(),
            resume: resume.to_string(),
            tags: TagSet::parse_list(tags),
        },
        _ => return None,
    };

    Some(directive)
}
