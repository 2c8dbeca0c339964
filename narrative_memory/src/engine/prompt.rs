//! Prompt turns sent to the language model.

use campaign_state::ChatMessage;

const GAME_MASTER_HEADER: &str = "TU ES LE MAÎTRE DE JEU.";

const AUTHORING_RULES: &str = "DIRECTIVES:
- Réponds en 2-3 phrases maximum
- Sois immersif et cohérent
- Avance la narration naturellement
- Sois créatif: crée des éléments UNIQUES et VARIÉS
- Réutilise les éléments existants quand c'est pertinent";

/// Markup the model may emit to write to campaign memory.
pub const DIRECTIVE_GRAMMAR: &str = "MISE À JOUR PNJ:
[UPDATE:PNJ|Nom|émotion|+/-valeur|raison]
Ex: [UPDATE:PNJ|Lyna|confiance|+30|sauvetage]
Règles: Événements TRÈS importants seulement. Max 1-2 par réponse.

SAUVEGARDE:
[SAVE:LIEU|Nom|Description|tags]
[SAVE:PNJ|Nom|Rôle|Description|tags]
[SAVE:EVENT|Titre|Description|Conséquences|tags]
[SAVE:CHAPTER|Titre|Résumé|tags]";

/// Build the system turn around the composed campaign context.
pub fn system_prompt(context: &str, style: &str, allow_memory_write: bool) -> String {
    let mut prompt = String::new();

    prompt.push_str(GAME_MASTER_HEADER);
    prompt.push_str("\n\nMÉMOIRE CAMPAGNE:\n");
    prompt.push_str(context);
    prompt.push_str("\n\n");
    prompt.push_str(AUTHORING_RULES);
    prompt.push('\n');

    if !style.trim().is_empty() {
        prompt.push_str(&format!("- Style de narration: {}\n", style.trim()));
    }

    if allow_memory_write {
        prompt.push('\n');
        prompt.push_str(DIRECTIVE_GRAMMAR);
        prompt.push('\n');
    }

    prompt
}

/// The turns for one completion: the system turn, then the latest user turn only.
pub fn prompt_turns(
    context: &str,
    style: &str,
    allow_memory_write: bool,
    user_message: &str,
) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(context, style, allow_memory_write)),
        ChatMessage::user(user_message),
    ]
}
