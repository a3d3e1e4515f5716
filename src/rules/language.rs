//! Language detection over business-document vocabulary.

/// Keyword votes per language. The window keeps detection O(1) on large
/// documents; business vocabulary clusters in the header anyway.
const SAMPLE_WINDOW: usize = 800;

const LANGUAGE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "invoice", "receipt", "total", "amount", "date", "due", "payment",
            "bill", "customer", "subtotal", "tax", "order",
        ],
    ),
    (
        "fr",
        &[
            "facture", "montant", "tva", "client", "paiement", "commande",
            "prix", "somme", "reglement", "echeance",
        ],
    ),
    (
        "de",
        &[
            "rechnung", "betrag", "mwst", "gesamt", "kunde", "zahlung",
            "datum", "summe", "preis", "lieferung",
        ],
    ),
    (
        "es",
        &[
            "factura", "importe", "iva", "cliente", "pago", "pedido",
            "precio", "fecha", "vencimiento", "suma",
        ],
    ),
    (
        "it",
        &[
            "fattura", "importo", "iva", "cliente", "pagamento", "ordine",
            "prezzo", "data", "scadenza", "totale",
        ],
    ),
];

/// Detect the document language as a BCP-47 tag from {en, fr, de, es, it}.
/// Defaults to `en`.
pub fn detect_language(text: &str) -> String {
    let sample: String = text.chars().take(SAMPLE_WINDOW).collect::<String>().to_lowercase();

    let mut best = "en";
    let mut best_score = 0usize;

    for (tag, keywords) in LANGUAGE_KEYWORDS {
        let score = keywords.iter().filter(|k| sample.contains(*k)).count();
        if score > best_score {
            best = tag;
            best_score = score;
        }
    }

    best.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_default() {
        assert_eq!(detect_language(""), "en");
        assert_eq!(detect_language("INVOICE\nTotal due: $10"), "en");
    }

    #[test]
    fn test_french() {
        let text = "FACTURE\nMontant TVA: 20,00\nClient: Dupont\nPaiement sous 30 jours";
        assert_eq!(detect_language(text), "fr");
    }

    #[test]
    fn test_german() {
        let text = "RECHNUNG\nBetrag: 119,00\nMwSt 19%\nKunde: Schmidt\nZahlung: Summe sofort";
        assert_eq!(detect_language(text), "de");
    }

    #[test]
    fn test_spanish_beats_italian_on_vocabulary() {
        let text = "FACTURA\nImporte: 121,00\nIVA 21%\nCliente: Garcia\nPago: 30 dias\nPedido 7";
        assert_eq!(detect_language(text), "es");
    }
}
