use rs_predict_core::model::corpus_model::RawModel;
use rs_predict_core::model::predictor::Predictor;
use rs_predict_core::model::probability::convert;
use rs_predict_core::model::pruner::{prune, PruneConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A tiny embedded corpus: natural sentences, a shouted header that
    // gets skipped, an abbreviation and a proper noun.
    let corpus = [
        "DAILY NEWS BULLETIN",
        "The quick fox jumps over the lazy dog.",
        "the quick fox runs past the lazy dog.",
        "A reporter from NASA visited Paris last week.",
        "the quick dog sleeps while the fox runs.",
        "She said the fox runs faster than the dog.",
    ];

    // Aggregate the corpus line by line into the raw count tables
    let mut model = RawModel::new();
    for line in corpus {
        model.observe_line(line);
    }
    println!("Aggregated {} sentences, {} unique words", model.sentences(), model.unigrams().len());

    // Prune with budgets loose enough for a toy corpus; real corpora
    // use the defaults (top_k = 20000, min counts 5/3/2/2)
    let config = PruneConfig {
        top_k: 100,
        min_unigram_count: 1,
        min_bigram_count: 1,
        min_trigram_count: 1,
        min_cap_count: 1,
    };
    let (pruned, stats) = prune(&model, &config)?;
    println!(
        "Pruned vocabulary: {} words, model shrank by {:.1}%",
        pruned.vocabulary().len(),
        stats.reduction_percent()
    );

    // A top_k of zero is a caller error and is rejected up front
    match prune(&model, &PruneConfig { top_k: 0, ..config }) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("A top_k of 0 is invalid, as expected"),
    }

    // Convert the surviving counts into conditional probabilities
    let (probs, _) = convert(&pruned);
    let predictor = Predictor::new(&probs);

    // Next-word prediction with trigram context and bigram backoff
    for (word, prob) in predictor.suggest_next(&["the", "quick"], 3) {
        println!("After 'the quick': {} ({:.2})", word, prob);
    }

    // Word completion from a typed prefix
    for (word, prob) in predictor.complete("fo", 3) {
        println!("Completion of 'fo': {} ({:.2})", word, prob);
    }

    // Capitalization restoration for abbreviations and proper nouns
    println!("Restored casing: {}", predictor.restore_case("nasa"));
    println!("Restored casing: {}", predictor.restore_case("paris"));

    // Generate a short sentence by weighted sampling over the model
    let mut sentence: Vec<String> = vec!["the".to_owned()];
    while sentence.len() < 8 {
        let context: Vec<&str> = sentence.iter().map(String::as_str).collect();
        match predictor.sample_next(&context) {
            Some(word) => sentence.push(word),
            None => break,
        }
    }
    println!("Sampled sentence: {}", sentence.join(" "));

    Ok(())
}
