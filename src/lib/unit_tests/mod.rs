// SPDX-License-Identifier: Apache-2.0

mod testlib;

mod bridge;
mod emit;
mod ethernet;
mod nullable;
mod route;
mod state;
mod tunnel;
mod vrf;
mod wifi;
