use std::{
    io::{self, stdin, stdout, Write},
    sync::mpsc,
    thread::{self, JoinHandle},
    time::Duration,
};

use cellrs::{pos, Pos};
use termion::{event::Key, input::TermRead, raw::IntoRawMode};
use tracing::{error, info};

use crate::{
    sim::{Frame, SimCmd},
    SimHandle,
};

pub use canvas::{Canvas, Tile};
mod canvas;

pub struct View {
    thread: JoinHandle<()>,
}

impl View {
    pub fn spawn(handle: SimHandle) -> Self {
        let thread = thread::spawn(move || {
            if let Err(error) = view_loop(&handle) {
                error!(%error, "terminal view failed");
            }
            // stops the simulation whatever made the view return
            handle.send(SimCmd::Exit);
        });
        Self { thread }
    }

    pub fn join(self) {
        if self.thread.join().is_err() {
            error!("view thread panicked");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug)]
pub enum InputCmd {
    Exit,
    Move(Dir),
    Sim(SimCmd),
}

fn command_for(key: Key) -> Option<InputCmd> {
    let command = match key {
        Key::Char('q') | Key::Esc | Key::Ctrl('c') => InputCmd::Exit,
        Key::Up => InputCmd::Move(Dir::Up),
        Key::Down => InputCmd::Move(Dir::Down),
        Key::Left => InputCmd::Move(Dir::Left),
        Key::Right => InputCmd::Move(Dir::Right),
        Key::Char(' ') => InputCmd::Sim(SimCmd::Toggle),
        Key::Char('n') => InputCmd::Sim(SimCmd::Step),
        Key::Char('+') => InputCmd::Sim(SimCmd::Accelerate),
        Key::Char('-') => InputCmd::Sim(SimCmd::Decelerate),
        Key::Char('s') => InputCmd::Sim(SimCmd::Save),
        Key::Char('r') => InputCmd::Sim(SimCmd::Restore),
        Key::Char('c') => InputCmd::Sim(SimCmd::Clear),
        _ => return None,
    };
    Some(command)
}

fn input_loop(sender: mpsc::Sender<InputCmd>) {
    for key in stdin().keys() {
        let Ok(key) = key else { break };
        let Some(command) = command_for(key) else {
            continue;
        };
        if sender.send(command).is_err() {
            break;
        }
    }
}

const VIEW_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

fn view_loop(handle: &SimHandle) -> io::Result<()> {
    let mut stdout = stdout().into_raw_mode()?;
    write!(stdout, "{}{}", termion::cursor::Hide, termion::clear::All)?;

    let (sender, receiver) = mpsc::channel();
    let _input_handle = thread::spawn(|| input_loop(sender));

    let mut view_origin = pos!(0, 0);
    let result = loop {
        if !handle_inputs(&receiver, &mut view_origin, handle) {
            info!("leaving the view");
            break Ok(());
        }
        let Some(frame) = handle.snapshot() else {
            break Ok(());
        };
        if let Err(error) = display_frame(&mut stdout, view_origin, &frame) {
            break Err(error);
        }
        thread::sleep(VIEW_REFRESH_INTERVAL);
    };

    write!(
        stdout,
        "{}{}{}",
        termion::style::Reset,
        termion::clear::All,
        termion::cursor::Show
    )?;
    stdout.flush()?;
    result
}

/// applies pending inputs, `false` once the user asked to leave.
fn handle_inputs(
    receiver: &mpsc::Receiver<InputCmd>,
    view_origin: &mut Pos,
    handle: &SimHandle,
) -> bool {
    while let Ok(cmd) = receiver.try_recv() {
        match cmd {
            InputCmd::Exit => return false,
            InputCmd::Move(direction) => *view_origin = *view_origin + step(direction),
            InputCmd::Sim(cmd) => {
                if !handle.send(cmd) {
                    return false;
                }
            }
        }
    }
    true
}

fn step(direction: Dir) -> Pos {
    match direction {
        Dir::Up => pos!(0, -4),
        Dir::Down => pos!(0, 4),
        Dir::Left => pos!(-4, 0),
        Dir::Right => pos!(4, 0),
    }
}

fn display_frame(out: &mut impl Write, view_origin: Pos, frame: &Frame) -> io::Result<()> {
    let mut canvas = Canvas::from_screen()?;
    canvas.layer(|pos| tile_at(frame, view_origin + pos));
    canvas.display(out, &status(frame))
}

fn tile_at(frame: &Frame, pos: Pos) -> Option<Tile> {
    let state = frame.get(pos)?;
    let rule = frame.rules.get(state).ok()?;
    Some(Tile::new(state.symbol(), rule.text_color(), rule.color()))
}

fn status(frame: &Frame) -> String {
    let running = if frame.running { "running" } else { "paused" };
    let populations = frame
        .rules
        .states()
        .into_iter()
        .filter_map(|state| {
            let rule = frame.rules.get(state).ok()?;
            Some(format!("{}: {}", rule.name(), frame.population(state)))
        })
        .collect::<Vec<_>>()
        .join(" ");
    let mut status = match &frame.name {
        Some(name) => format!(" {name} |"),
        None => String::new(),
    };
    status += &format!(
        " {} | gen {} | {} | {}ms | {}",
        frame.rules.name(),
        frame.generation,
        running,
        frame.interval.as_millis(),
        populations,
    );
    if let Some(message) = &frame.message {
        status += &format!(" | {message}");
    }
    status
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cellrs::{catalogs, Snapshot};

    use super::*;

    fn frame() -> Frame {
        let [e, l] = [catalogs::EMPTY, catalogs::ALIVE];
        Frame {
            name: None,
            cells: Snapshot::new(vec![vec![e, l], vec![e, e]]),
            rules: Arc::new(catalogs::life()),
            generation: 7,
            running: false,
            interval: Duration::from_millis(200),
            message: Some("saved generation 7".to_string()),
        }
    }

    #[test]
    fn keys_map_to_commands() {
        assert!(matches!(command_for(Key::Char('q')), Some(InputCmd::Exit)));
        assert!(matches!(
            command_for(Key::Left),
            Some(InputCmd::Move(Dir::Left))
        ));
        assert!(matches!(
            command_for(Key::Char(' ')),
            Some(InputCmd::Sim(SimCmd::Toggle))
        ));
        assert!(command_for(Key::Char('x')).is_none());
    }

    #[test]
    fn tiles_use_the_rule_colors() {
        let frame = frame();
        let tile = tile_at(&frame, pos!(2, 1)).unwrap();
        assert_eq!(tile.glyph, 'l');
        assert_eq!(tile.bg, (255, 215, 0));
        assert_eq!(tile.fg, (1, 22, 39));
    }

    #[test]
    fn status_line() {
        assert_eq!(
            status(&frame()),
            " life | gen 7 | paused | 200ms | Empty: 3 Life: 1 | saved generation 7"
        );
    }

    #[test]
    fn status_line_starts_with_the_world_name() {
        let frame = Frame {
            name: Some("lab".to_string()),
            message: None,
            ..frame()
        };
        assert_eq!(
            status(&frame),
            " lab | life | gen 7 | paused | 200ms | Empty: 3 Life: 1"
        );
    }

    #[test]
    fn sim_commands_are_forwarded() {
        let (sender, receiver) = mpsc::channel();
        let (input, inputs) = mpsc::channel();
        let handle = SimHandle::new(sender);
        input.send(InputCmd::Move(Dir::Down)).unwrap();
        input.send(InputCmd::Sim(SimCmd::Save)).unwrap();
        let mut origin = pos!(0, 0);
        assert!(handle_inputs(&inputs, &mut origin, &handle));
        assert_eq!(origin, pos!(0, 4));
        assert!(matches!(receiver.try_recv(), Ok(SimCmd::Save)));

        input.send(InputCmd::Exit).unwrap();
        assert!(!handle_inputs(&inputs, &mut origin, &handle));
    }
}
