use thumbforge::engine::measure::{FontSpec, FontWeight};
use thumbforge::engine::reference::find_reference_spans;
use thumbforge::engine::wrap::{tokenize, wrap_text, TokenKind};
use thumbforge::rendering::font::{BlockFace, Typeface};

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "Grace",
    "For God so loved the world (John 3:16) that he gave",
    "Read 1:4 - 1:9 and then 2:1-3:4 before 5:6",
    "  leading and trailing whitespace  ",
    "tabs\tand\nnewlines between words",
    "Supercalifragilisticexpialidocious is one long word",
    "숫자 3:16 그리고 한국어 텍스트가 섞인 제목",
    "émigré café naïve 12:1-14",
];

fn block_measure(text: &str, font: FontSpec) -> f32 {
    BlockFace::default().measure_width(text, font)
}

#[test]
fn tokens_reproduce_source() {
    for sample in SAMPLES {
        let joined: String = tokenize(sample).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(&joined, sample, "tokenize lost characters of {:?}", sample);
    }
}

#[test]
fn reference_spans_stay_whole() {
    for sample in SAMPLES {
        let references: Vec<&str> = find_reference_spans(sample).into_iter().map(|r| &sample[r]).collect();
        let atomic: Vec<String> = tokenize(sample)
            .into_iter()
            .filter(|t| t.kind == TokenKind::AtomicReference)
            .map(|t| t.text)
            .collect();
        assert_eq!(atomic, references, "reference tokens differ for {:?}", sample);

        for width in [200.0, 400.0, 800.0] {
            let lines = wrap_text(&block_measure, sample, width, 30.0, FontWeight::Bold);
            for reference in &references {
                // a reference fits any of these widths, so it must land on one line
                assert!(
                    lines.iter().any(|line| line.contains(reference)),
                    "{:?} was split across {:?}",
                    reference,
                    lines
                );
            }
        }
    }
}

#[test]
fn lines_fit_unless_a_single_grapheme_overflows() {
    for sample in SAMPLES {
        for width in [40.0, 120.0, 300.0, 1120.0] {
            for size in [20.0, 56.0, 96.0] {
                let font = FontSpec::bold(size);
                let lines = wrap_text(&block_measure, sample, width, size, FontWeight::Bold);
                assert!(!lines.is_empty());
                for line in &lines {
                    let fits = block_measure(line, font) <= width;
                    let single = line.chars().count() <= 1;
                    assert!(
                        fits || single,
                        "{:?} overflows {}px at {}px: {:?}",
                        line,
                        width,
                        size,
                        lines
                    );
                }
            }
        }
    }
}

#[test]
fn wrapping_keeps_reading_order() {
    let text = "one two three four five six seven eight nine ten";
    let lines = wrap_text(&block_measure, text, 150.0, 30.0, FontWeight::Normal);
    assert!(lines.len() > 1);
    assert_eq!(lines.join(" "), text);
}

#[test]
fn blank_text_is_one_empty_line() {
    assert_eq!(wrap_text(&block_measure, "", 100.0, 30.0, FontWeight::Normal), vec![String::new()]);
    assert_eq!(wrap_text(&block_measure, " \t ", 100.0, 30.0, FontWeight::Normal), vec![String::new()]);
}
