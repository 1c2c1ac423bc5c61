// Copyright (C) 2020-2026 Andy Kurnia.

use lexplay::{
    board, board_state, display, engine, error, game_config, lexicon, logger, movegen,
};
use std::sync::Arc;

static HELP: &str = "commands:
  load <wordlist.txt|index.kwg>  use this dictionary
  board                          show the board
  put <8h|h8> <word>             place a word, 8h across, h8 down
  rack <letters>                 set the rack, ? for blank
  gen [n]                        show the best n plays (default 15)
  anchors                        show where plays can go and what fits
  clear                          empty the board
  source <file>                  run commands from a file
  help                           this
  exit";

// 8h is across from row 8 col h, h8 is down.
fn parse_coord(s: &str, dim: lexplay::matrix::Dim) -> Option<(bool, i8, i8)> {
    let b = s.as_bytes();
    let (down, letter, digits) = if b.first()?.is_ascii_lowercase() {
        (true, b[0], &s[1..])
    } else if b.last()?.is_ascii_lowercase() {
        (false, b[b.len() - 1], &s[..s.len() - 1])
    } else {
        return None;
    };
    let row = digits.parse::<i8>().ok()?.checked_sub(1)?;
    let col = (letter - b'a') as i8;
    if !dim.contains(row, col) {
        return None;
    }
    Some(if down { (true, col, row) } else { (false, row, col) })
}

fn arg(strings: &[String], i: usize) -> error::Returns<&String> {
    match strings.get(i) {
        Some(s) => Ok(s),
        None => Err(error::new("need another arg".into()).into()),
    }
}

struct Shell {
    game_config: Arc<game_config::GameConfig>,
    engine: Option<engine::Engine>,
    board: board::Board,
    rack: Vec<u8>,
}

impl Shell {
    fn new() -> Self {
        let game_config = Arc::new(game_config::make_english_game_config());
        let board = board::Board::new(game_config.board_layout().dim());
        Self {
            game_config,
            engine: None,
            board,
            rack: Vec::new(),
        }
    }

    fn load(&mut self, path: &str) -> error::Returns<()> {
        let t0 = std::time::Instant::now();
        let lexicon = if path.ends_with(".kwg") {
            lexicon::Lexicon::from_kwg_bytes(&std::fs::read(path)?)?
        } else {
            lexicon::Lexicon::build(
                self.game_config.alphabet(),
                lexicon::read_word_source(path)?,
            )?
        };
        println!("{} words in {:?}", lexicon.num_words(), t0.elapsed());
        self.engine = Some(engine::Engine::new(
            Arc::clone(&self.game_config),
            Arc::new(lexicon),
            engine::EngineConfig::default(),
        ));
        Ok(())
    }

    fn put(&mut self, coord: &str, word: &str) -> error::Returns<()> {
        let alphabet = self.game_config.alphabet();
        let dim = self.board.dim();
        let (down, lane, idx) = match parse_coord(coord, dim) {
            Some(x) => x,
            None => {
                lexplay::return_error!(format!("invalid coordinate {:?}", coord));
            }
        };
        let strider = dim.lane(down, lane);
        let mut tiles = Vec::new();
        for (i, c) in (idx..).zip(word.chars()) {
            if i >= strider.len() {
                lexplay::return_error!("word does not fit".into());
            }
            let tile = match alphabet.parse_board_char(c) {
                Some(tile) => tile,
                None => {
                    lexplay::return_error!(format!("invalid tile {:?}", c));
                }
            };
            let on_board = self.board.tiles()[strider.at(i)];
            // letters already there are played through.
            tiles.push(if on_board == tile { 0 } else { tile });
        }
        let play = movegen::Candidate::new(down, lane, idx, &tiles, 0);
        self.board.place(alphabet, &play)?;
        Ok(())
    }

    fn engine(&self) -> error::Returns<&engine::Engine> {
        match &self.engine {
            Some(engine) => Ok(engine),
            None => Err(error::new("load a dictionary first".into()).into()),
        }
    }

    // one line per anchor: the square, then what fits across and down.
    fn fmt_anchors(&self) -> error::Returns<Vec<String>> {
        let engine = self.engine()?;
        let alphabet = self.game_config.alphabet();
        let board_state =
            board_state::BoardState::new(&self.game_config, engine.lexicon(), &self.board)?;
        let fmt_check = |check: board_state::CrossCheck| match check {
            board_state::CrossCheck::Occupied => "-".to_string(),
            board_state::CrossCheck::Unconstrained => "*".to_string(),
            board_state::CrossCheck::Letters(letters) if letters.is_empty() => "none".to_string(),
            board_state::CrossCheck::Letters(letters) => alphabet.fmt_word(&letters),
        };
        Ok(board_state
            .anchors()
            .iter()
            .map(|&(row, col)| {
                format!(
                    "{} across {} down {}",
                    display::fmt_coord(false, row, col),
                    fmt_check(board_state.cross_check(false, row, col)),
                    fmt_check(board_state.cross_check(true, row, col)),
                )
            })
            .collect())
    }

    fn show_plays(&self, n: usize) -> error::Returns<()> {
        let engine = self.engine()?;
        let alphabet = self.game_config.alphabet();
        let t0 = std::time::Instant::now();
        match engine.find_moves(&self.board, &self.rack) {
            Ok(ranked) => {
                for (i, ranked_move) in ranked.iter().take(n).enumerate() {
                    print!(
                        "{:3}: {} {}",
                        i + 1,
                        display::fmt_play(alphabet, &self.board, &ranked_move.candidate),
                        ranked_move.scored.total
                    );
                    for word_score in &ranked_move.scored.words {
                        print!(" / {} {}", word_score.word, word_score.score);
                    }
                    if ranked_move.scored.full_rack_bonus != 0 {
                        print!(" / bonus {}", ranked_move.scored.full_rack_bonus);
                    }
                    println!();
                }
                println!("{} plays in {:?}", ranked.len(), t0.elapsed());
            }
            Err(err) if err.is_recoverable() => println!("{}, pass or exchange", err),
            Err(err) => return Err(err.into()),
        }
        Ok(())
    }

    // false to exit.
    fn run(
        &mut self,
        strings: &[String],
        cmd_stack: &mut Vec<(String, Option<(String, usize)>)>,
    ) -> error::Returns<bool> {
        match strings[0].as_str() {
            "help" => println!("{}", HELP),
            "exit" => return Ok(false),
            "load" => self.load(arg(strings, 1)?)?,
            "board" => display::print_board(
                self.game_config.alphabet(),
                self.game_config.board_layout(),
                self.board.tiles(),
            ),
            "put" => {
                self.put(arg(strings, 1)?, arg(strings, 2)?)?;
                display::print_board(
                    self.game_config.alphabet(),
                    self.game_config.board_layout(),
                    self.board.tiles(),
                );
            }
            "rack" => match self.game_config.alphabet().parse_rack(arg(strings, 1)?) {
                Some(rack) => self.rack = rack,
                None => println!("invalid rack"),
            },
            "gen" => {
                let n = match strings.get(1) {
                    Some(s) => s.parse()?,
                    None => 15,
                };
                self.show_plays(n)?;
            }
            "anchors" => {
                for line in self.fmt_anchors()? {
                    println!("{}", line);
                }
            }
            "clear" => self.board = board::Board::new(self.board.dim()),
            "source" => {
                let filename = arg(strings, 1)?;
                let whole_file = std::fs::read_to_string(filename)?;
                let v = cmd_stack.len();
                for (line_num, line) in whole_file.lines().enumerate() {
                    cmd_stack.push((line.to_string(), Some((filename.clone(), line_num + 1))));
                }
                cmd_stack[v..].reverse();
            }
            _ => println!("invalid input, help for help"),
        }
        Ok(true)
    }
}

fn main() -> error::Returns<()> {
    logger::init_from_env();
    let mut rl = rustyline::DefaultEditor::new()?;
    let mut shell = Shell::new();
    let mut cmd_stack = Vec::<(String, Option<(String, usize)>)>::new();
    for path in std::env::args().skip(1) {
        cmd_stack.push((format!("source {}", shell_words::quote(&path)), None));
    }
    cmd_stack.reverse();
    loop {
        if let Some((line, source)) = cmd_stack.pop() {
            if let Some((filename, line_num)) = source {
                println!("{}:{}> {}", filename, line_num, line);
            }
            match shell_words::split(&line) {
                Ok(strings) => {
                    if !strings.is_empty() {
                        match shell.run(&strings, &mut cmd_stack) {
                            Ok(true) => {}
                            Ok(false) => break,
                            Err(err) => println!("error: {}", err),
                        }
                    }
                }
                Err(err) => {
                    println!("Bad quoting: {:?}", err);
                }
            }
        } else {
            match rl.readline(">> ") {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    cmd_stack.push((line, None));
                }
                Err(rustyline::error::ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(rustyline::error::ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    println!("Error: {:?}", err);
                    break;
                }
            }
        }
    }

    Ok(())
}
