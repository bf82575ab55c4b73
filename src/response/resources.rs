//! Static help resources attached to every classified reply.
use crate::classification::MoodLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSection {
    pub heading: &'static str,
    pub items: &'static [&'static str],
}

const HELPLINES: ResourceSection = ResourceSection {
    heading: "🆘 Líneas de ayuda inmediata:",
    items: &[
        "📞 Teléfono de la Esperanza: 717 003 717 (disponible 24/7)",
        "📞 Cruz Roja Responde: 900 107 917",
        "📞 Línea de atención al suicidio: 024 (gratuita 24/7)",
    ],
};

const DEPRESSION_RESOURCES: ResourceSection = ResourceSection {
    heading: "💡 Recursos adicionales:",
    items: &[
        "💡 Considera hablar con un profesional de salud mental",
        "💡 Mantén una rutina diaria estructurada",
        "💡 Busca apoyo en familiares y amigos cercanos",
    ],
};

const TECHNIQUES: ResourceSection = ResourceSection {
    heading: "🧘 Técnicas que pueden ayudar:",
    items: &[
        "🧘 Respiración 4-7-8: Inhala 4 seg, mantén 7 seg, exhala 8 seg",
        "🧘 Técnica de grounding: Nombra 5 cosas que ves, 4 que tocas, 3 que oyes",
        "🧘 Meditación mindfulness de 5 minutos",
    ],
};

const ANXIETY_RESOURCES: ResourceSection = ResourceSection {
    heading: "💡 Recursos adicionales:",
    items: &[
        "💡 Directorio de psicólogos: colegiodepsicologos.es",
        "💡 Apps recomendadas: Calm, Headspace para meditación",
        "💡 Considera terapia cognitivo-conductual (TCC)",
    ],
};

const PREVENTION: ResourceSection = ResourceSection {
    heading: "✨ Recomendaciones para el bienestar:",
    items: &[
        "✨ Mantén hábitos saludables: sueño regular, ejercicio, alimentación balanceada",
        "✨ Practica autocuidado y establece límites saludables",
        "✨ Cultiva relaciones sociales positivas",
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceBundle {
    sections: &'static [ResourceSection],
}

impl ResourceBundle {
    #[must_use]
    pub fn for_label(label: MoodLabel) -> Self {
        let sections: &'static [ResourceSection] = match label {
            MoodLabel::Depression => &[HELPLINES, DEPRESSION_RESOURCES],
            MoodLabel::Anxiety => &[TECHNIQUES, ANXIETY_RESOURCES],
            MoodLabel::Neutral => &[PREVENTION],
        };
        Self { sections }
    }

    #[must_use]
    pub fn sections(&self) -> &'static [ResourceSection] {
        self.sections
    }

    /// Each section as a blank line, its heading and one line per item.
    #[must_use]
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        for section in self.sections {
            lines.push(format!("\n{}", section.heading));
            lines.extend(section.items.iter().map(|item| (*item).to_string()));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depression_lists_helplines_before_resources() {
        let bundle = ResourceBundle::for_label(MoodLabel::Depression);
        let headings: Vec<_> = bundle.sections().iter().map(|s| s.heading).collect();
        assert_eq!(
            headings,
            vec!["🆘 Líneas de ayuda inmediata:", "💡 Recursos adicionales:"]
        );
    }

    #[test]
    fn every_label_has_resources() {
        for label in MoodLabel::ALL {
            let bundle = ResourceBundle::for_label(label);
            assert!(!bundle.sections().is_empty());
            assert!(bundle.sections().iter().all(|s| s.items.len() == 3));
        }
    }

    #[test]
    fn render_separates_sections_with_blank_lines() {
        let rendered = ResourceBundle::for_label(MoodLabel::Neutral).render();
        assert_eq!(
            rendered,
            "\n✨ Recomendaciones para el bienestar:\n\
             ✨ Mantén hábitos saludables: sueño regular, ejercicio, alimentación balanceada\n\
             ✨ Practica autocuidado y establece límites saludables\n\
             ✨ Cultiva relaciones sociales positivas"
        );

        let anxiety = ResourceBundle::for_label(MoodLabel::Anxiety).render();
        assert!(anxiety.contains("Meditación mindfulness de 5 minutos\n\n💡 Recursos adicionales:"));
    }
}
