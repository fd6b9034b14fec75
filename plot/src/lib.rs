mod plot;
mod plot_set;
mod plot_thread;

pub use plot::Plot;
pub use plot_set::PlotSet;
pub use plot_thread::{spawn_plot_thread, PlotSender, PlotThreadMessage};
