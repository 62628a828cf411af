use crate::histogram::LinearHistogram;
use crate::records::UserRecord;
use mpticks_common::{HistogramsConfig, MpticksError, ReportConfig, Result};
use serde::Serialize;
use std::io::Write;

/// Distribution of per-user imports, routes and ticks.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    pub users: u64,
    pub imports: LinearHistogram,
    pub routes: LinearHistogram,
    pub ticks: LinearHistogram,
}

impl UsageReport {
    pub fn new(cfg: &HistogramsConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            users: 0,
            imports: LinearHistogram::from_domain(&cfg.imports)?,
            routes: LinearHistogram::from_domain(&cfg.routes)?,
            ticks: LinearHistogram::from_domain(&cfg.ticks)?,
        })
    }

    pub fn record(&mut self, user: &UserRecord) {
        self.users += 1;
        self.imports.add(user.num_imports);
        self.routes.add(user.num_routes);
        self.ticks.add(user.total_ticks());
    }

    pub fn write<W: Write>(&self, w: &mut W, cfg: &ReportConfig) -> Result<()> {
        let lw = cfg.label_width;
        let bw = cfg.bar_width;
        write!(w, "Users: {}\n\nImports:\n", self.users).map_err(MpticksError::WriteFailure)?;
        self.imports.render(w, lw, bw)?;
        w.write_all(b"\nRoutes:\n").map_err(MpticksError::WriteFailure)?;
        self.routes.render(w, lw, bw)?;
        w.write_all(b"\nTicks:\n").map_err(MpticksError::WriteFailure)?;
        self.ticks.render(w, lw, bw)?;
        Ok(())
    }
}

impl<'a> Extend<&'a UserRecord> for UsageReport {
    fn extend<I: IntoIterator<Item = &'a UserRecord>>(&mut self, users: I) {
        for u in users {
            self.record(u);
        }
    }
}
