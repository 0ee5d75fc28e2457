use std::collections::HashMap;

use crate::types::RawRow;

/// Semantic fields the pipeline needs out of a raw row. The header set of
/// the source is not fixed, so each field resolves through a synonym table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Client,
    Date,
    Amount,
    Employee,
    Service,
    StartTime,
    EndTime,
    Period,
    Family,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Client,
        Field::Date,
        Field::Amount,
        Field::Employee,
        Field::Service,
        Field::StartTime,
        Field::EndTime,
        Field::Period,
        Field::Family,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Client => "client",
            Field::Date => "date",
            Field::Amount => "amount",
            Field::Employee => "employee",
            Field::Service => "service",
            Field::StartTime => "start_time",
            Field::EndTime => "end_time",
            Field::Period => "period",
            Field::Family => "family",
        }
    }

    /// Known header spellings, pre-folded (lowercase, no accents).
    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Field::Client => &["cliente", "nome do cliente", "nome", "client"],
            Field::Date => &[
                "data",
                "data de pagamento",
                "data do pagamento",
                "data da visita",
                "payment date",
                "date",
            ],
            Field::Amount => &["valor", "valor pago", "preco", "amount", "total"],
            Field::Employee => &["funcionario", "profissional", "barbeiro", "atendente", "employee"],
            Field::Service => &["servico", "servico/produto", "produto", "descricao", "service"],
            Field::StartTime => &["hora inicio", "hora de inicio", "inicio", "start time", "start"],
            Field::EndTime => &["hora fim", "hora de termino", "termino", "fim", "end time", "end"],
            Field::Period => &["periodo", "turno", "period"],
            Field::Family => &["familia", "grupo familiar", "grupo", "family"],
        }
    }
}

/// Lowercases, trims and strips Portuguese diacritics so header lookup is
/// tolerant of accent and case variants.
pub fn fold(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

/// Truncated headers shorter than this never prefix-match, so that stubs
/// like "da" cannot claim a field.
const MIN_PREFIX_LEN: usize = 5;

/// Resolved mapping from semantic field to the actual header present in the
/// source batch. Missing optional columns simply have no entry.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    headers: HashMap<Field, String>,
}

impl ColumnMap {
    /// Resolves each semantic field against the given headers: exact folded
    /// match first, then a prefix match to tolerate headers truncated by the
    /// source export (e.g. "Data de pagame" for "data de pagamento").
    pub fn resolve(headers: &[String]) -> Self {
        let folded: Vec<(String, &String)> = headers.iter().map(|h| (fold(h), h)).collect();
        let mut map = HashMap::new();

        for field in Field::ALL {
            let synonyms = field.synonyms();

            let exact = folded
                .iter()
                .find(|(f, _)| synonyms.iter().any(|s| *s == f.as_str()));
            if let Some((_, original)) = exact {
                map.insert(field, (*original).clone());
                continue;
            }

            let prefix = folded.iter().find(|(f, _)| {
                f.len() >= MIN_PREFIX_LEN
                    && synonyms
                        .iter()
                        .any(|s| s.starts_with(f.as_str()) || f.starts_with(s))
            });
            if let Some((_, original)) = prefix {
                map.insert(field, (*original).clone());
            }
        }

        Self { headers: map }
    }

    pub fn has(&self, field: Field) -> bool {
        self.headers.contains_key(&field)
    }

    /// Cell text for `field` in `row`, trimmed; `None` when the column is
    /// absent or the cell is blank.
    pub fn get<'a>(&self, row: &'a RawRow, field: Field) -> Option<&'a str> {
        let header = self.headers.get(&field)?;
        let value = row.get(header)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value)
        }
    }
}
