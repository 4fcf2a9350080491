use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Awareness article shown next to the report form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDto {
    pub title: String,
    pub content: String,
}

const ARTICLES: &[(&str, &str)] = &[
    (
        "Como identificar maus-tratos a animais?",
        "Fique atento a sinais como magreza extrema, feridas não tratadas, falta de acesso a água e comida, ambiente sujo e comportamento medroso ou agressivo. Animais acorrentados por longos períodos ou em espaços pequenos também é um sinal de alerta.",
    ),
    (
        "Legislação: Lei de Crimes Ambientais",
        "A Lei nº 9.605/98, conhecida como Lei de Crimes Ambientais, prevê pena de detenção de três meses a um ano, e multa, para quem \"praticar ato de abuso, maus-tratos, ferir ou mutilar animais silvestres, domésticos ou domesticados, nativos ou exóticos\". A pena é aumentada quando ocorre a morte do animal.",
    ),
    (
        "A importância da posse responsável",
        "Ser um tutor responsável significa garantir o bem-estar do seu animal de estimação, fornecendo alimentação adequada, cuidados veterinários, um ambiente seguro, carinho e atenção. Castrar seu animal também é um ato de responsabilidade, pois evita a superpopulação e o abandono.",
    ),
    (
        "O que fazer ao presenciar maus-tratos?",
        "Se você presenciar uma situação de maus-tratos, não hesite em denunciar. Use nossa plataforma para enviar um relatório detalhado. Você também pode contatar a Polícia Militar pelo 190. Sua ação pode ser a única esperança para o animal.",
    ),
];

/// The fixed set of awareness articles, in display order
pub fn educational_articles() -> Vec<ArticleDto> {
    ARTICLES
        .iter()
        .map(|(title, content)| ArticleDto {
            title: title.to_string(),
            content: content.to_string(),
        })
        .collect()
}
