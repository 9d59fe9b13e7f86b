//! Curated featured items

use r2v_common::model::FeaturedItem;

const FEATURED: &[(&str, &str, &str)] = &[
    (
        "Bohemian Rhapsody",
        "Queen",
        "A six-minute suite, notable for its lack of a refraining chorus and instead consisting of several sections",
    ),
    (
        "Blinding Lights",
        "The Weeknd",
        "A synth-pop and nu-disco song with a pulsing beat and retro 1980s feel",
    ),
    (
        "Don't Start Now",
        "Dua Lipa",
        "A disco-pop and nu-disco song with elements of 1970s disco and 1980s pop",
    ),
    (
        "Watermelon Sugar",
        "Harry Styles",
        "A pop rock and soft rock song with elements of funk and psychedelic pop",
    ),
    (
        "Levitating",
        "Dua Lipa ft. DaBaby",
        "A disco-pop and dance-pop song with elements of 1970s and 1980s dance music",
    ),
    (
        "Save Your Tears",
        "The Weeknd",
        "A synth-pop and new wave song with a retro 1980s feel",
    ),
    (
        "Stay",
        "The Kid LAROI, Justin Bieber",
        "A pop and emo rap song with a melancholic yet catchy melody",
    ),
    (
        "good 4 u",
        "Olivia Rodrigo",
        "A pop-punk and pop-rock song with angsty lyrics and energetic instrumentals",
    ),
    (
        "Montero",
        "Lil Nas X",
        "A pop-rap and trap song with Middle Eastern influences and provocative lyrics",
    ),
];

/// The static recommendation list
pub fn featured_items() -> Vec<FeaturedItem> {
    FEATURED
        .iter()
        .map(|(title, artist, description)| FeaturedItem {
            title: title.to_string(),
            category: artist.to_string(),
            description: description.to_string(),
            link: "#".to_string(),
        })
        .collect()
}
