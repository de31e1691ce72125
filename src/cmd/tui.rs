use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::stdout;
use tui_input::{Input, InputRequest};

use crate::{
    config::Settings,
    corpus::DocumentSource,
    matcher::Matcher,
    types::Answer,
};

const PLACEHOLDER: &str = "e.g. What is the policy for annual leaves?";

pub struct TuiApp {
    pub input: Input,
    pub question: String,
    pub answer: Option<Answer>,
    pub show_snippet: bool,
    matcher: Matcher,
    source: Box<dyn DocumentSource>,
    refusal_message: String,
}

impl TuiApp {
    pub fn new(settings: Settings, source: Box<dyn DocumentSource>) -> Self {
        Self {
            input: Input::default(),
            question: String::new(),
            answer: None,
            show_snippet: false,
            matcher: Matcher::new(&settings),
            source,
            refusal_message: settings.refusal_message,
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let res = self.run_app(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            terminal.draw(|f| self.ui(f))?;

            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if self.handle_key(key) {
                    return Ok(());
                }
            }
        }
    }

    /// Apply one key press. Returns true when the page should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('c') if ctrl => return true,
            KeyCode::Char('r') if ctrl => self.reset(),
            KeyCode::Enter => self.submit(),
            KeyCode::Tab => self.show_snippet = !self.show_snippet,
            code => {
                let request = match code {
                    KeyCode::Char(c) => Some(InputRequest::InsertChar(c)),
                    KeyCode::Backspace => Some(InputRequest::DeletePrevChar),
                    KeyCode::Delete => Some(InputRequest::DeleteNextChar),
                    KeyCode::Left => Some(InputRequest::GoToPrevChar),
                    KeyCode::Right => Some(InputRequest::GoToNextChar),
                    KeyCode::Home => Some(InputRequest::GoToStart),
                    KeyCode::End => Some(InputRequest::GoToEnd),
                    _ => None,
                };
                if let Some(request) = request {
                    self.input.handle(request);
                }
            }
        }

        false
    }

    /// Ask the question currently in the input box
    pub fn submit(&mut self) {
        let question = self.input.value().trim().to_string();
        if question.is_empty() {
            return;
        }

        self.answer = Some(self.matcher.answer(&question, self.source.as_ref()));
        self.question = question;
        self.show_snippet = false;
    }

    /// Clear the page. Nothing is kept between questions, so this only
    /// resets what is on screen.
    pub fn reset(&mut self) {
        self.input.reset();
        self.question.clear();
        self.answer = None;
        self.show_snippet = false;
    }

    fn ui(&self, f: &mut Frame) {
        let size = f.size();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(2), // Header
                    Constraint::Length(3), // Question input
                    Constraint::Min(0),    // Answer
                    Constraint::Length(2), // Status bar
                ]
                .as_ref(),
            )
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_input(f, chunks[1]);
        match &self.answer {
            None => self.draw_placeholder(f, chunks[2]),
            Some(Answer::Found(_)) => self.draw_answer(f, chunks[2]),
            Some(Answer::Refused { .. }) => self.draw_refusal(f, chunks[2]),
        }
        self.draw_status_bar(f, chunks[3]);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(Span::styled(
                "Policy Assistant",
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Answers come only from the policy corpus.",
                Style::default().fg(Color::Gray),
            )),
        ];
        f.render_widget(Paragraph::new(lines), area);
    }

    fn draw_input(&self, f: &mut Frame, area: Rect) {
        let width = area.width.saturating_sub(2) as usize;
        let scroll = self.input.visual_scroll(width.saturating_sub(1));

        let block = Block::default()
            .title("How can I help you today?")
            .borders(Borders::ALL);

        let paragraph = if self.input.value().is_empty() {
            Paragraph::new(Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray)))
        } else {
            Paragraph::new(self.input.value()).scroll((0, scroll as u16))
        };
        f.render_widget(paragraph.block(block), area);

        let cursor = self.input.visual_cursor().saturating_sub(scroll) as u16;
        f.set_cursor(area.x + 1 + cursor, area.y + 1);
    }

    fn draw_placeholder(&self, f: &mut Frame, area: Rect) {
        let hint = Paragraph::new("Type a question and press Enter.")
            .block(Block::default().title("AI Response").borders(Borders::ALL));
        f.render_widget(hint, area);
    }

    fn draw_answer(&self, f: &mut Frame, area: Rect) {
        let Some(Answer::Found(result)) = &self.answer else {
            return;
        };

        let snippet_height = if self.show_snippet { 7 } else { 3 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                [
                    Constraint::Min(3),
                    Constraint::Length(3),
                    Constraint::Length(snippet_height),
                ]
                .as_ref(),
            )
            .split(area);

        let answer = Paragraph::new(result.answer.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title(format!("AI Response: {}", self.question))
                    .borders(Borders::ALL),
            );
        f.render_widget(answer, chunks[0]);

        let source = Paragraph::new(Line::from(vec![
            Span::styled("Source Document: ", Style::default().fg(Color::Green)),
            Span::styled(
                result.source.as_str(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]))
        .block(Block::default().title("Sources & Citations").borders(Borders::ALL));
        f.render_widget(source, chunks[1]);

        let (title, body) = if self.show_snippet {
            ("▾ View Source Snippet (Tab)", result.snippet.as_str())
        } else {
            ("▸ View Source Snippet (Tab)", "")
        };
        let snippet = Paragraph::new(Span::styled(
            body,
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(snippet, chunks[2]);
    }

    fn draw_refusal(&self, f: &mut Frame, area: Rect) {
        let warning = Paragraph::new(Span::styled(
            format!("⚠ {}", self.refusal_message),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("AI Response").borders(Borders::ALL));
        f.render_widget(warning, area);
    }

    fn draw_status_bar(&self, f: &mut Frame, area: Rect) {
        let status_text = match &self.answer {
            Some(answer) => format!(
                "Latency: {} seconds  |  Enter ask  Tab snippet  Ctrl+R refresh  Esc quit",
                answer.latency_secs()
            ),
            None => "Enter ask  Tab snippet  Ctrl+R refresh  Esc quit".to_string(),
        };

        let status = Paragraph::new(status_text).block(Block::default().borders(Borders::TOP));
        f.render_widget(status, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::MemorySource;
    use crate::types::RefusalReason;
    use ratatui::backend::TestBackend;

    fn app() -> TuiApp {
        let source = MemorySource::from_pairs([
            ("leave.txt", "Annual leave policy allows 20 days per year."),
            ("travel.txt", "Travel is reimbursed within 30 days."),
        ]);
        TuiApp::new(Settings::default(), Box::new(source))
    }

    fn type_text(app: &mut TuiApp, text: &str) {
        for c in text.chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn press(app: &mut TuiApp, code: KeyCode, modifiers: KeyModifiers) -> bool {
        app.handle_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn enter_answers_question() {
        let mut app = app();
        type_text(&mut app, "annual leave");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);

        let result = app.answer.as_ref().and_then(Answer::found).unwrap();
        assert_eq!(result.source, "leave.txt");
        assert_eq!(app.question, "annual leave");
    }

    #[test]
    fn unmatched_question_is_refused() {
        let mut app = app();
        type_text(&mut app, "xyz");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(
            app.answer.as_ref().and_then(Answer::refusal_reason),
            Some(RefusalReason::NoMatch)
        );
    }

    #[test]
    fn empty_input_does_nothing() {
        let mut app = app();
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        assert!(app.answer.is_none());
    }

    #[test]
    fn editing_keys_change_input() {
        let mut app = app();
        type_text(&mut app, "travelx");
        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.input.value(), "travel");
    }

    #[test]
    fn tab_toggles_snippet_and_refresh_clears() {
        let mut app = app();
        type_text(&mut app, "travel");
        press(&mut app, KeyCode::Enter, KeyModifiers::NONE);
        press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert!(app.show_snippet);

        press(&mut app, KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(app.answer.is_none());
        assert!(app.input.value().is_empty());
        assert!(!app.show_snippet);
    }

    #[test]
    fn escape_quits() {
        let mut app = app();
        assert!(press(&mut app, KeyCode::Esc, KeyModifiers::NONE));
        assert!(press(&mut app, KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!press(&mut app, KeyCode::Char('c'), KeyModifiers::NONE));
    }

    #[test]
    fn draws_every_state() {
        let mut app = app();
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal.draw(|f| app.ui(f)).unwrap();

        type_text(&mut app, "annual");
        app.submit();
        app.show_snippet = true;
        terminal.draw(|f| app.ui(f)).unwrap();

        app.input.reset();
        type_text(&mut app, "xyz");
        app.submit();
        terminal.draw(|f| app.ui(f)).unwrap();
    }
}
