// Copyright (C) 2020-2026 Andy Kurnia.

use lexplay::{alphabet, error, lexicon, logger};

fn make_alphabet(csv_path: Option<&String>) -> error::Returns<alphabet::Alphabet> {
    let alphabet = alphabet::make_english_alphabet();
    Ok(match csv_path {
        Some(path) => alphabet.with_values_from_csv(std::fs::File::open(path)?)?,
        None => alphabet,
    })
}

fn main() -> error::Returns<()> {
    logger::init_from_env();
    let args = std::env::args().collect::<Vec<_>>();
    if args.len() < 4 {
        println!(
            "args:
  kwg wordlist.txt out.kwg [values.csv]
    build the index from a word list, one word per line
  dump in.kwg out.txt
    write the words of an index back out, in order
  check in.kwg word...
    look up words"
        );
        return Ok(());
    }
    let t0 = std::time::Instant::now();
    match args[1].as_str() {
        "kwg" => {
            let alphabet = make_alphabet(args.get(4))?;
            let words = lexicon::read_word_source(&args[2])?;
            let lexicon = lexicon::Lexicon::build(&alphabet, &words)?;
            std::fs::write(&args[3], lexicon.to_kwg_bytes())?;
            println!("{} words", lexicon.num_words());
        }
        "dump" => {
            let lexicon = lexicon::Lexicon::from_kwg_bytes(&std::fs::read(&args[2])?)?;
            let alphabet = alphabet::make_english_alphabet();
            let mut out = String::new();
            lexicon.kwg().for_each_word(|word| {
                out.push_str(&alphabet.fmt_word(word));
                out.push('\n');
            });
            std::fs::write(&args[3], out)?;
            println!("{} words", lexicon.num_words());
        }
        "check" => {
            let lexicon = lexicon::Lexicon::from_kwg_bytes(&std::fs::read(&args[2])?)?;
            let alphabet = alphabet::make_english_alphabet();
            for word in &args[3..] {
                match alphabet.parse_word(word) {
                    Some(machine_word) if !machine_word.is_empty() => {
                        println!("{} {}", word, lexicon.is_word(&machine_word));
                    }
                    _ => println!("{} invalid", word),
                }
            }
        }
        _ => {
            lexplay::return_error!(format!("invalid command {:?}", args[1]));
        }
    }
    println!("time taken: {:?}", t0.elapsed());
    Ok(())
}
