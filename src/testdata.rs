//! Synthetic fixture dataset shared by the unit tests: two regions, two
//! reps, three accounts, five orders spanning 2013/2014/2017, five web
//! events. Small enough to reason about by hand.

use std::fs;
use std::path::Path;

pub fn write_minimal_dataset(dir: &Path) {
    fs::write(
        dir.join("region.csv"),
        "id,name\n\
         1,Northeast\n\
         2,West\n",
    )
    .unwrap();
    fs::write(
        dir.join("sales_reps.csv"),
        "id,name,region_id\n\
         1,Alice Ray,1\n\
         2,Bob Cole,2\n",
    )
    .unwrap();
    fs::write(
        dir.join("accounts.csv"),
        "id,name,website,lat,long,primary_poc,sales_rep_id\n\
         1,Acme,www.acme.com,41.0,-75.0,Jane Doe,1\n\
         2,Globex,www.globex.com,40.5,-74.2,Tom Lin,1\n\
         3,Initech,www.initech.com,37.7,-122.4,Sam Ode,2\n",
    )
    .unwrap();
    fs::write(
        dir.join("orders.csv"),
        "id,account_id,occurred_at,standard_qty,gloss_qty,poster_qty,total,\
         standard_amt_usd,gloss_amt_usd,poster_amt_usd,total_amt_usd\n\
         1,1,2013-05-10 12:00:00,120,10,60,190,599.0,74.9,487.2,1161.1\n\
         2,1,2014-03-01 09:30:00,50,5,10,65,249.5,37.45,81.2,368.15\n\
         3,2,2017-11-20 18:45:00,200,20,80,300,998.0,149.8,649.6,1797.4\n\
         4,3,2017-01-05 10:00:00,10,2,3,15,49.9,14.98,24.36,89.24\n\
         5,2,2013-07-14 16:20:00,30,0,5,35,149.7,0,40.6,190.3\n",
    )
    .unwrap();
    fs::write(
        dir.join("web_events.csv"),
        "id,account_id,occurred_at,channel\n\
         1,1,2013-05-09 11:00:00,direct\n\
         2,1,2013-05-09 11:30:00,facebook\n\
         3,2,2017-11-19 10:00:00,direct\n\
         4,3,2017-01-04 09:00:00,organic\n\
         5,1,2014-02-28 08:00:00,adwords\n",
    )
    .unwrap();
}
