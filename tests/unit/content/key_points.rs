use super::*;

#[test]
fn keyword_sentences_rank_first() {
    let text = "The weather in Funchal was pleasant all week long. \
        Kombucha is a probiotic drink that may support gut health! \
        Short one. \
        A small study suggests kombucha can improve digestion? \
        Our shop opens every morning at nine o'clock sharp.";
    let points = extract_key_points(text, 3);
    assert_eq!(
        points,
        [
            "Kombucha is a probiotic drink that may support gut health",
            "A small study suggests kombucha can improve digestion",
            "The weather in Funchal was pleasant all week long",
        ]
    );
}

#[test]
fn ties_keep_document_order() {
    let text = "First sentence mentions health only once. Second sentence mentions gut only once.";
    let points = extract_key_points(text, 5);
    assert_eq!(
        points,
        [
            "First sentence mentions health only once",
            "Second sentence mentions gut only once",
        ]
    );
}

#[test]
fn zero_max_or_empty_text_yields_nothing() {
    assert!(extract_key_points("Kombucha is great for your gut health.", 0).is_empty());
    assert!(extract_key_points("", 3).is_empty());
}
