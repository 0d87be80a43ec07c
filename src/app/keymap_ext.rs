use crate::app::App;
use crate::models::Endpoint;

pub trait AppKeymapExt {
    fn selected_endpoint(&self) -> Option<&Endpoint>;
}

impl AppKeymapExt for App {
    fn selected_endpoint(&self) -> Option<&Endpoint> {
        self.endpoints.get(self.selected)
    }
}
