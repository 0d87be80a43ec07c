use crate::app::keymap_ext::AppKeymapExt;
use crate::app::types::{App, FocusField, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

impl App {
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.view {
            View::List => self.handle_list_key(key),
            View::Edit => self.handle_edit_key(key),
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
            KeyCode::Char('r') => self.reload_endpoints(),
            KeyCode::Char('e') => self.open_endpoints_editor()?,
            KeyCode::Enter => {
                if let Some(endpoint) = self.selected_endpoint() {
                    tracing::info!("Opening edit view for endpoint {}", endpoint.id);
                    let id = endpoint.id;
                    self.open_edit(id);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_edit_key(&mut self, key: KeyEvent) -> Result<()> {
        // Submit works from any focused field.
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.submit_update();
            return Ok(());
        }

        match key.code {
            KeyCode::Esc => self.go_to_list(false),
            KeyCode::Tab | KeyCode::Down => {
                if let Some(session) = &mut self.edit {
                    session.focus_next();
                }
            }
            KeyCode::BackTab | KeyCode::Up => {
                if let Some(session) = &mut self.edit {
                    session.focus_previous();
                }
            }
            KeyCode::Char(c) => self.edit_field_input(c),
            KeyCode::Backspace => self.edit_field_backspace(),
            KeyCode::Enter => {
                if let Some(session) = &mut self.edit {
                    match session.focus {
                        FocusField::Tls => session.toggle_tls(),
                        FocusField::Mode => session.form.mode = session.form.mode.next(),
                        FocusField::Group => session.cycle_group(),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn edit_field_input(&mut self, c: char) {
        let Some(session) = &mut self.edit else {
            return;
        };
        match session.focus {
            FocusField::Name => session.endpoint.name.push(c),
            FocusField::Url => session.endpoint.url.push(c),
            FocusField::PublicUrl => {
                session.endpoint.public_url.get_or_insert_with(String::new).push(c);
            }
            FocusField::CaCert => session.form.ca_cert.push(c),
            FocusField::Cert => session.form.cert.push(c),
            FocusField::Key => session.form.key.push(c),
            // Space toggles the non-text fields.
            FocusField::Tls if c == ' ' => session.toggle_tls(),
            FocusField::Mode if c == ' ' => session.form.mode = session.form.mode.next(),
            FocusField::Group if c == ' ' => session.cycle_group(),
            _ => {}
        }
    }

    fn edit_field_backspace(&mut self) {
        let Some(session) = &mut self.edit else {
            return;
        };
        match session.focus {
            FocusField::Name => {
                session.endpoint.name.pop();
            }
            FocusField::Url => {
                session.endpoint.url.pop();
            }
            FocusField::PublicUrl => {
                if let Some(url) = &mut session.endpoint.public_url {
                    url.pop();
                }
            }
            FocusField::CaCert => {
                session.form.ca_cert.pop();
            }
            FocusField::Cert => {
                session.form.cert.pop();
            }
            FocusField::Key => {
                session.form.key.pop();
            }
            _ => {}
        }
    }
}
